//! Status prober: infers job completion from durable side effects.
//!
//! Probing never consults the job registry: the scanner's table or report
//! file is the source of truth, so status survives a bridge restart.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::models::job::{PendingReason, ProbeStatus};
use crate::models::scanner::ScannerKind;
use crate::models::target::TargetKey;
use crate::persistence::result_store::ResultStore;
use crate::report;
use crate::{AppError, Result};

/// Checks for the artifact each scanner produces on completion.
#[derive(Debug, Clone)]
pub struct StatusProber {
    store: ResultStore,
    reports_dir: PathBuf,
}

impl StatusProber {
    /// Create a prober over the shared store and the report directory.
    #[must_use]
    pub fn new(store: ResultStore, reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            reports_dir: reports_dir.into(),
        }
    }

    /// Probe the artifact of `kind` for `target`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` for store failures other than lock
    /// contention; a locked store is reported as pending. Returns
    /// `AppError::InvalidArgument` for a report name that is not a plain
    /// file name.
    pub async fn probe(&self, kind: ScannerKind, target: &TargetKey) -> Result<ProbeStatus> {
        let artifact = target.artifact_name();
        match kind {
            ScannerKind::Subdomain => self.probe_table(artifact).await,
            ScannerKind::Directory => self.probe_report(artifact).await,
        }
    }

    /// Table-existence variant.
    ///
    /// # Errors
    ///
    /// See [`StatusProber::probe`].
    pub async fn probe_table(&self, artifact: String) -> Result<ProbeStatus> {
        if !self.store.exists().await {
            debug!(store = %self.store.path().display(), "result store not created yet");
            return Ok(ProbeStatus::Pending {
                artifact,
                reason: PendingReason::StoreMissing,
            });
        }

        match self.store.table_exists(&artifact).await {
            Ok(true) => Ok(ProbeStatus::Complete { artifact }),
            Ok(false) => Ok(ProbeStatus::Pending {
                artifact,
                reason: PendingReason::ArtifactMissing,
            }),
            Err(AppError::StoreBusy(msg)) => {
                warn!(%msg, artifact = %artifact, "result store locked, reporting pending");
                Ok(ProbeStatus::Pending {
                    artifact,
                    reason: PendingReason::StoreBusy,
                })
            }
            Err(err) => Err(err),
        }
    }

    /// File-existence variant.
    ///
    /// # Errors
    ///
    /// See [`StatusProber::probe`].
    pub async fn probe_report(&self, artifact: String) -> Result<ProbeStatus> {
        let path = report::report_path(&self.reports_dir, &artifact)?;
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            Ok(ProbeStatus::Complete { artifact })
        } else {
            Ok(ProbeStatus::Pending {
                artifact,
                reason: PendingReason::ArtifactMissing,
            })
        }
    }
}
