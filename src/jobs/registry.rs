//! Job registry: the most recent process handle per scanner and target.
//!
//! The registry only prevents relaunching a job that is still alive. It is
//! in-memory and lost on restart; completion is never read from here but
//! from the durable artifacts (see [`crate::probe`]). Entries are not reaped:
//! a dead handle stays until the next launch for the same key replaces it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::models::job::{JobState, JobSummary, LaunchOutcome};
use crate::models::scanner::ScannerKind;
use crate::models::target::TargetKey;
use crate::Result;

/// Handle to a launched external process.
pub trait TrackedProcess: Send {
    /// OS process id, if the platform still reports one.
    fn id(&self) -> Option<u32>;

    /// Non-blocking liveness check.
    fn poll(&mut self) -> JobState;
}

struct JobHandle {
    started_at: DateTime<Utc>,
    process: Box<dyn TrackedProcess>,
}

type JobKey = (ScannerKind, TargetKey);

/// Process-wide map from `(scanner, target)` to the latest launched job.
///
/// All access goes through an internal mutex, so the check-then-spawn in
/// [`JobRegistry::launch_if_idle`] is atomic with respect to other launches.
#[derive(Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<JobKey, JobHandle>>,
}

impl JobRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a job for `target` unless a live one is already tracked.
    ///
    /// `spawn` runs while the registry lock is held and only when no live
    /// handle exists. On success the new handle replaces any dead one.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `spawn`; the registry is left
    /// unchanged in that case.
    pub async fn launch_if_idle<F>(
        &self,
        kind: ScannerKind,
        target: &TargetKey,
        spawn: F,
    ) -> Result<LaunchOutcome>
    where
        F: FnOnce() -> Result<Box<dyn TrackedProcess>>,
    {
        let mut jobs = self.jobs.lock().await;
        let key = (kind, target.clone());

        if let Some(existing) = jobs.get_mut(&key) {
            if existing.process.poll().is_running() {
                return Ok(LaunchOutcome::AlreadyRunning {
                    pid: existing.process.id(),
                    started_at: existing.started_at,
                });
            }
        }

        let process = spawn()?;
        let pid = process.id();
        jobs.insert(
            key,
            JobHandle {
                started_at: Utc::now(),
                process,
            },
        );

        Ok(LaunchOutcome::Started { pid })
    }

    /// Summaries of every tracked job, ordered by scanner then target.
    pub async fn snapshot(&self) -> Vec<JobSummary> {
        let mut jobs = self.jobs.lock().await;
        let mut summaries: Vec<JobSummary> = jobs
            .iter_mut()
            .map(|((kind, target), handle)| JobSummary {
                kind: *kind,
                target: target.as_str().to_owned(),
                pid: handle.process.id(),
                started_at: handle.started_at,
                state: handle.process.poll(),
            })
            .collect();
        summaries.sort_by(|a, b| (a.kind, &a.target).cmp(&(b.kind, &b.target)));
        summaries
    }
}
