//! Job launcher: builds a scanner command line and starts it detached.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use super::registry::JobRegistry;
use super::spawner::{Invocation, ProcessSpawner};
use crate::config::{ScannerCommand, REPORT_PLACEHOLDER, TARGET_PLACEHOLDER};
use crate::models::job::LaunchOutcome;
use crate::models::target::TargetKey;
use crate::report;
use crate::{AppError, Result};

/// Starts scanner jobs and records them in the shared [`JobRegistry`].
#[derive(Clone)]
pub struct JobLauncher {
    registry: Arc<JobRegistry>,
    spawner: Arc<dyn ProcessSpawner>,
}

impl JobLauncher {
    /// Create a launcher over an injected registry and spawn strategy.
    #[must_use]
    pub fn new(registry: Arc<JobRegistry>, spawner: Arc<dyn ProcessSpawner>) -> Self {
        Self { registry, spawner }
    }

    /// Registry this launcher writes to.
    #[must_use]
    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    /// Launch `command` for `target` unless a live job already exists.
    ///
    /// Returns as soon as the process has been spawned; the scanner keeps
    /// running after the calling request completes.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Spawn` if the script or interpreter is missing or
    /// the OS refuses to start the process, or `AppError::InvalidArgument`
    /// if the template writes a report and the target is not a plain file
    /// name.
    pub async fn launch(
        &self,
        command: &ScannerCommand,
        reports_dir: &Path,
        target: &TargetKey,
    ) -> Result<LaunchOutcome> {
        let span = info_span!("launch", scanner = %command.kind, target = %target);

        async move {
            let spawner = Arc::clone(&self.spawner);

            let outcome = self
                .registry
                .launch_if_idle(command.kind, target, || {
                    let invocation = build_invocation(command, reports_dir, target)?;
                    preflight(command, reports_dir)?;
                    spawner.spawn(&invocation)
                })
                .await;

            match &outcome {
                Ok(LaunchOutcome::Started { pid }) => {
                    info!(pid = pid.unwrap_or(0), "scan job started");
                }
                Ok(LaunchOutcome::AlreadyRunning { pid, .. }) => {
                    info!(pid = pid.unwrap_or(0), "scan job already running");
                }
                Err(err) => warn!(%err, "scan job launch failed"),
            }

            outcome
        }
        .instrument(span)
        .await
    }
}

/// Expand the argument template for `target`.
///
/// The result is `program script args...` with `{target}` replaced by the
/// trimmed key and `{report}` by the absolute report path for its artifact.
///
/// # Errors
///
/// Returns `AppError::InvalidArgument` if the template uses `{report}` and
/// the artifact contains a path separator.
pub fn build_invocation(
    command: &ScannerCommand,
    reports_dir: &Path,
    target: &TargetKey,
) -> Result<Invocation> {
    let report_path = if command
        .args
        .iter()
        .any(|arg| arg.contains(REPORT_PLACEHOLDER))
    {
        report::report_path(reports_dir, &target.artifact_name())?
            .to_string_lossy()
            .into_owned()
    } else {
        String::new()
    };

    let mut args = Vec::with_capacity(command.args.len() + 1);
    args.push(command.script.to_string_lossy().into_owned());
    args.extend(command.args.iter().map(|arg| {
        arg.replace(TARGET_PLACEHOLDER, target.as_str())
            .replace(REPORT_PLACEHOLDER, &report_path)
    }));

    Ok(Invocation {
        program: command.program.clone(),
        args,
        working_dir: command.working_dir.clone(),
    })
}

/// Catch the common misconfigurations before handing off to the OS, which
/// would otherwise start an interpreter that exits immediately.
fn preflight(command: &ScannerCommand, reports_dir: &Path) -> Result<()> {
    if !command.script.is_file() {
        return Err(AppError::Spawn(format!(
            "scanner script not found: {}",
            command.script.display()
        )));
    }

    if command.program.components().count() > 1 && !command.program.is_file() {
        return Err(AppError::Spawn(format!(
            "interpreter not found: {}",
            command.program.display()
        )));
    }

    if command
        .args
        .iter()
        .any(|arg| arg.contains(REPORT_PLACEHOLDER))
    {
        std::fs::create_dir_all(reports_dir).map_err(|err| {
            AppError::Spawn(format!(
                "cannot create report directory {}: {err}",
                reports_dir.display()
            ))
        })?;
    }

    Ok(())
}
