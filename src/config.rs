//! Global configuration parsing, validation, and path resolution.
//!
//! Every field has a default so the bridge can start without a config file.
//! Relative paths are resolved once, during validation, against
//! `tools_root`; the resolved layout is then fixed for the process lifetime.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::models::scanner::ScannerKind;
use crate::{AppError, Result};

/// Placeholder replaced with the trimmed target key in argument templates.
pub const TARGET_PLACEHOLDER: &str = "{target}";

/// Placeholder replaced with the absolute report path in argument templates.
pub const REPORT_PLACEHOLDER: &str = "{report}";

/// Subdomain enumerator layout.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SubdomainConfig {
    /// Tool directory, relative to `tools_root`. Used as the working directory.
    #[serde(default = "default_subdomain_dir")]
    pub dir: PathBuf,
    /// Interpreter, relative to `dir` unless absolute or a bare program name.
    #[serde(default = "default_venv_python")]
    pub interpreter: PathBuf,
    /// Entry script, relative to `dir`.
    #[serde(default = "default_subdomain_script")]
    pub script: PathBuf,
    /// Argument template appended after the script.
    #[serde(default = "default_subdomain_args")]
    pub args: Vec<String>,
    /// Shared `SQLite` result store, relative to `dir`.
    #[serde(default = "default_store")]
    pub store: PathBuf,
}

impl Default for SubdomainConfig {
    fn default() -> Self {
        Self {
            dir: default_subdomain_dir(),
            interpreter: default_venv_python(),
            script: default_subdomain_script(),
            args: default_subdomain_args(),
            store: default_store(),
        }
    }
}

/// Directory brute-forcer layout.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct DirectoryConfig {
    /// Tool directory, relative to `tools_root`. Used as the working directory.
    #[serde(default = "default_directory_dir")]
    pub dir: PathBuf,
    /// Interpreter, relative to `dir` unless absolute or a bare program name.
    #[serde(default = "default_system_python")]
    pub interpreter: PathBuf,
    /// Entry script, relative to `dir`.
    #[serde(default = "default_directory_script")]
    pub script: PathBuf,
    /// Argument template appended after the script.
    #[serde(default = "default_directory_args")]
    pub args: Vec<String>,
    /// Directory holding one `<artifact>.txt` report per target, relative to `dir`.
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            dir: default_directory_dir(),
            interpreter: default_system_python(),
            script: default_directory_script(),
            args: default_directory_args(),
            reports_dir: default_reports_dir(),
        }
    }
}

fn default_tools_root() -> PathBuf {
    PathBuf::from("..")
}

fn default_lock_timeout_seconds() -> u64 {
    10
}

fn default_max_rows() -> usize {
    50
}

fn default_self_test_timeout_seconds() -> u64 {
    30
}

fn default_subdomain_dir() -> PathBuf {
    PathBuf::from("OneForAll")
}

fn default_venv_python() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(".venv").join("Scripts").join("python.exe")
    } else {
        PathBuf::from(".venv").join("bin").join("python")
    }
}

fn default_subdomain_script() -> PathBuf {
    PathBuf::from("oneforall.py")
}

fn default_subdomain_args() -> Vec<String> {
    vec!["--target".into(), TARGET_PLACEHOLDER.into(), "run".into()]
}

fn default_store() -> PathBuf {
    PathBuf::from("results").join("result.sqlite3")
}

fn default_directory_dir() -> PathBuf {
    PathBuf::from("dirsearch")
}

fn default_system_python() -> PathBuf {
    PathBuf::from("python3")
}

fn default_directory_script() -> PathBuf {
    PathBuf::from("dirsearch.py")
}

fn default_directory_args() -> Vec<String> {
    vec![
        "-u".into(),
        format!("http://{TARGET_PLACEHOLDER}"),
        "--plain-text-report".into(),
        REPORT_PLACEHOLDER.into(),
    ]
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

/// Fully resolved command line pieces for one scanner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannerCommand {
    /// Scanner this command launches.
    pub kind: ScannerKind,
    /// Working directory for the child process.
    pub working_dir: PathBuf,
    /// Interpreter or executable.
    pub program: PathBuf,
    /// Entry script passed as the first argument.
    pub script: PathBuf,
    /// Argument template, still containing placeholders.
    pub args: Vec<String>,
}

/// Absolute paths derived from the configuration at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ResolvedPaths {
    subdomain: ScannerCommand,
    directory: ScannerCommand,
    store: PathBuf,
    reports_dir: PathBuf,
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Base directory that scanner directories are resolved against.
    #[serde(default = "default_tools_root")]
    pub tools_root: PathBuf,
    /// Bounded wait for result store locks.
    #[serde(default = "default_lock_timeout_seconds")]
    pub lock_timeout_seconds: u64,
    /// Maximum rows rendered by `run_query`.
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
    /// Upper bound for a `self_test` invocation.
    #[serde(default = "default_self_test_timeout_seconds")]
    pub self_test_timeout_seconds: u64,
    /// Subdomain enumerator settings.
    #[serde(default)]
    pub subdomain: SubdomainConfig,
    /// Directory brute-forcer settings.
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(skip)]
    paths: ResolvedPaths,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string and resolve paths.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration with every default applied.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the working directory cannot be
    /// determined while resolving the default `tools_root`.
    pub fn default_layout() -> Result<Self> {
        Self::from_toml_str("")
    }

    /// Replace `tools_root` and re-resolve every derived path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the new root cannot be made absolute.
    pub fn with_tools_root(mut self, root: impl Into<PathBuf>) -> Result<Self> {
        self.tools_root = root.into();
        self.validate()?;
        Ok(self)
    }

    /// Resolved command for the given scanner.
    #[must_use]
    pub fn scanner(&self, kind: ScannerKind) -> &ScannerCommand {
        match kind {
            ScannerKind::Subdomain => &self.paths.subdomain,
            ScannerKind::Directory => &self.paths.directory,
        }
    }

    /// Absolute path of the shared `SQLite` result store.
    #[must_use]
    pub fn store_path(&self) -> &Path {
        &self.paths.store
    }

    /// Absolute directory holding directory-scan reports.
    #[must_use]
    pub fn reports_dir(&self) -> &Path {
        &self.paths.reports_dir
    }

    /// Lock wait applied to every result store connection.
    #[must_use]
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.lock_timeout_seconds)
    }

    /// Upper bound for a `self_test` run.
    #[must_use]
    pub fn self_test_timeout(&self) -> Duration {
        Duration::from_secs(self.self_test_timeout_seconds)
    }

    fn validate(&mut self) -> Result<()> {
        if self.max_rows == 0 {
            return Err(AppError::Config("max_rows must be greater than zero".into()));
        }

        if self.lock_timeout_seconds == 0 {
            return Err(AppError::Config(
                "lock_timeout_seconds must be greater than zero".into(),
            ));
        }

        for (section, args) in [
            ("subdomain", &self.subdomain.args),
            ("directory", &self.directory.args),
        ] {
            if !args.iter().any(|arg| arg.contains(TARGET_PLACEHOLDER)) {
                return Err(AppError::Config(format!(
                    "{section}.args must contain {TARGET_PLACEHOLDER}"
                )));
            }
        }

        self.tools_root = std::path::absolute(&self.tools_root)
            .map_err(|err| AppError::Config(format!("tools_root invalid: {err}")))?;

        let subdomain_dir = self.tools_root.join(&self.subdomain.dir);
        let directory_dir = self.tools_root.join(&self.directory.dir);

        self.paths = ResolvedPaths {
            store: subdomain_dir.join(&self.subdomain.store),
            reports_dir: directory_dir.join(&self.directory.reports_dir),
            subdomain: ScannerCommand {
                kind: ScannerKind::Subdomain,
                program: resolve_program(&subdomain_dir, &self.subdomain.interpreter),
                script: subdomain_dir.join(&self.subdomain.script),
                args: self.subdomain.args.clone(),
                working_dir: subdomain_dir,
            },
            directory: ScannerCommand {
                kind: ScannerKind::Directory,
                program: resolve_program(&directory_dir, &self.directory.interpreter),
                script: directory_dir.join(&self.directory.script),
                args: self.directory.args.clone(),
                working_dir: directory_dir,
            },
        };

        Ok(())
    }
}

/// Bare program names (`python3`) are left for `PATH` lookup; anything with a
/// directory component is taken relative to the tool directory.
fn resolve_program(dir: &Path, program: &Path) -> PathBuf {
    if program.is_absolute() || program.components().count() == 1 {
        program.to_path_buf()
    } else {
        dir.join(program)
    }
}
