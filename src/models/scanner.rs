//! External scanner kinds.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::AppError;

/// Which external scanner a job, probe, or self-test refers to.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "snake_case")]
pub enum ScannerKind {
    /// Subdomain enumerator writing one table per target into the shared store.
    #[default]
    Subdomain,
    /// Directory brute-forcer writing one plain-text report per target.
    Directory,
}

impl ScannerKind {
    /// Every supported scanner, in display order.
    pub const ALL: [Self; 2] = [Self::Subdomain, Self::Directory];

    /// Wire name used in tool arguments and log fields.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Subdomain => "subdomain",
            Self::Directory => "directory",
        }
    }
}

impl Display for ScannerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScannerKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "subdomain" => Ok(Self::Subdomain),
            "directory" => Ok(Self::Directory),
            other => Err(AppError::InvalidArgument(format!(
                "unknown scanner '{other}'; expected one of: subdomain, directory"
            ))),
        }
    }
}
