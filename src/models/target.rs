//! Target keys and the artifact names derived from them.

use std::fmt::{Display, Formatter};

use crate::{AppError, Result};

/// Normalized scan subject (typically a domain name).
///
/// Holds the trimmed, non-empty form of the caller's input. The same key is
/// passed to the external scanner verbatim and, after [`artifact_name`], names
/// the result table or report file the scanner produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetKey(String);

impl TargetKey {
    /// Parse a raw caller-supplied key, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidArgument` if the key is empty after trimming.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::InvalidArgument("target must not be empty".into()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The trimmed key as passed to the scanner.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Table or file stem the scanner writes for this key.
    #[must_use]
    pub fn artifact_name(&self) -> String {
        artifact_name(&self.0)
    }
}

impl Display for TargetKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Replace every `.` with `_`.
///
/// Distinct keys can collide (`a.b` and `a_b` both map to `a_b`); the
/// scanners name their artifacts this way, so the mapping is kept as is.
/// The substitution is idempotent, so an already-substituted name maps to
/// itself.
#[must_use]
pub fn artifact_name(key: &str) -> String {
    key.replace('.', "_")
}
