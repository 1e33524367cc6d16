//! Detached scanner process spawner.
//!
//! Scanner processes must outlive the tool call that started them. They get
//! null stdio, no `kill_on_drop`, and a platform detach strategy chosen at
//! build time: a fresh process group on Unix, a new process group without a
//! console window on Windows.

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::info;

use super::registry::TrackedProcess;
use crate::models::job::JobState;
use crate::{AppError, Result};

/// Fully expanded command line for one launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Interpreter or executable.
    pub program: PathBuf,
    /// Script followed by the expanded argument template.
    pub args: Vec<String>,
    /// Working directory for the child.
    pub working_dir: PathBuf,
}

/// Capability to start a process that is independent of the caller.
pub trait ProcessSpawner: Send + Sync {
    /// Start `invocation` and return a handle for liveness checks.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Spawn` if the OS refuses to create the process.
    fn spawn(&self, invocation: &Invocation) -> Result<Box<dyn TrackedProcess>>;
}

/// Production spawner using `tokio::process` and the platform detach strategy.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedSpawner;

impl ProcessSpawner for DetachedSpawner {
    fn spawn(&self, invocation: &Invocation) -> Result<Box<dyn TrackedProcess>> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(false);
        platform::detach(&mut cmd);

        let child = cmd.spawn().map_err(|err| {
            AppError::Spawn(format!(
                "failed to start {}: {err}",
                invocation.program.display()
            ))
        })?;

        info!(
            pid = child.id().unwrap_or(0),
            program = %invocation.program.display(),
            strategy = platform::STRATEGY,
            "scanner process spawned"
        );

        Ok(Box::new(DetachedChild(child)))
    }
}

struct DetachedChild(Child);

impl TrackedProcess for DetachedChild {
    fn id(&self) -> Option<u32> {
        self.0.id()
    }

    fn poll(&mut self) -> JobState {
        match self.0.try_wait() {
            Ok(None) => JobState::Running,
            Ok(Some(status)) => JobState::Exited(status.code()),
            Err(_) => JobState::Unknown,
        }
    }
}

#[cfg(unix)]
mod platform {
    use tokio::process::Command;

    pub const STRATEGY: &str = "new process group";

    pub fn detach(cmd: &mut Command) {
        cmd.process_group(0);
    }
}

#[cfg(windows)]
mod platform {
    use tokio::process::Command;

    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;

    pub const STRATEGY: &str = "new process group, no console window";

    pub fn detach(cmd: &mut Command) {
        cmd.creation_flags(CREATE_NEW_PROCESS_GROUP | CREATE_NO_WINDOW);
    }
}

#[cfg(not(any(unix, windows)))]
mod platform {
    use tokio::process::Command;

    pub const STRATEGY: &str = "null stdio only";

    pub fn detach(_cmd: &mut Command) {}
}
