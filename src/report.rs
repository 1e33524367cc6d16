//! Directory scan reports on disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::models::target::TargetKey;
use crate::{AppError, Result};

/// Deterministic report location for an artifact name.
///
/// The artifact must name a file directly inside `reports_dir`.
///
/// # Errors
///
/// Returns `AppError::InvalidArgument` if `artifact` contains a path
/// separator.
pub fn report_path(reports_dir: &Path, artifact: &str) -> Result<PathBuf> {
    if artifact.contains(['/', '\\']) {
        return Err(AppError::InvalidArgument(format!(
            "target `{artifact}` must not contain path separators"
        )));
    }
    Ok(reports_dir.join(format!("{artifact}.txt")))
}

/// Read the report written for `target`.
///
/// Accepts either the raw key or its substituted artifact form. Invalid
/// UTF-8 is replaced rather than rejected.
///
/// # Errors
///
/// Returns `AppError::InvalidArgument` if the target would resolve outside
/// `reports_dir`, `AppError::NotFound` if the report has not been written
/// yet, or `AppError::Io` if it exists but cannot be read.
pub async fn read_report(reports_dir: &Path, target: &TargetKey) -> Result<String> {
    let path = report_path(reports_dir, &target.artifact_name())?;
    match tokio::fs::read(&path).await {
        Ok(contents) => Ok(String::from_utf8_lossy(&contents).into_owned()),
        Err(err) if err.kind() == ErrorKind::NotFound => Err(AppError::NotFound(format!(
            "report {} has not been written yet",
            path.display()
        ))),
        Err(err) => Err(AppError::Io(format!(
            "failed to read report {}: {err}",
            path.display()
        ))),
    }
}
