//! Job lifecycle and probe outcomes.

use chrono::{DateTime, Utc};

use super::scanner::ScannerKind;

/// Observed state of a tracked external process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Process has not exited yet.
    Running,
    /// Process exited; `None` when terminated by a signal.
    Exited(Option<i32>),
    /// Liveness could not be determined.
    Unknown,
}

impl JobState {
    /// Whether the process should still be treated as alive.
    ///
    /// `Unknown` counts as alive so a failed liveness check never lets a
    /// second job start for the same key.
    #[must_use]
    pub fn is_running(self) -> bool {
        matches!(self, Self::Running | Self::Unknown)
    }
}

/// Result of a launch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// A new detached process was spawned.
    Started {
        /// OS process id, when the platform reports one.
        pid: Option<u32>,
    },
    /// A live process is already tracked for the key; nothing was spawned.
    AlreadyRunning {
        /// OS process id of the existing job.
        pid: Option<u32>,
        /// When the existing job was launched.
        started_at: DateTime<Utc>,
    },
}

/// Why a probe reported [`ProbeStatus::Pending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingReason {
    /// The result store file does not exist yet.
    StoreMissing,
    /// The store is locked by the scanner mid-write.
    StoreBusy,
    /// The store (or report directory) exists but the artifact does not.
    ArtifactMissing,
}

/// Completion status inferred from a scanner's durable side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    /// The expected artifact exists.
    Complete {
        /// Table or report file name that was found.
        artifact: String,
    },
    /// The artifact is not there yet.
    Pending {
        /// Table or report file name that is expected.
        artifact: String,
        /// Distinguishes a missing store from a busy store or a missing artifact.
        reason: PendingReason,
    },
}

impl ProbeStatus {
    /// Whether the probe found the artifact.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }
}

/// Point-in-time view of one registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    /// Scanner the job belongs to.
    pub kind: ScannerKind,
    /// Trimmed target key.
    pub target: String,
    /// OS process id, if known.
    pub pid: Option<u32>,
    /// Launch timestamp.
    pub started_at: DateTime<Utc>,
    /// Liveness at snapshot time.
    pub state: JobState,
}
