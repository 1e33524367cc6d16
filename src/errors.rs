//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// Caller supplied an empty or malformed argument.
    InvalidArgument(String),
    /// The operating system refused to start the external scanner.
    Spawn(String),
    /// Result store open or query failure unrelated to lock contention.
    Store(String),
    /// Result store is locked by a concurrent writer.
    StoreBusy(String),
    /// Requested artifact does not exist.
    NotFound(String),
    /// MCP protocol or transport failure.
    Mcp(String),
    /// File-system or I/O operation failure.
    Io(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::Spawn(msg) => write!(f, "spawn: {msg}"),
            Self::Store(msg) => write!(f, "store: {msg}"),
            Self::StoreBusy(msg) => write!(f, "store busy: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::Mcp(msg) => write!(f, "mcp: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let busy = matches!(
            sqlite_primary_code(&err),
            Some(SQLITE_BUSY | SQLITE_LOCKED)
        );
        let message = err.to_string();
        if busy {
            Self::StoreBusy(message)
        } else {
            Self::Store(message)
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Another connection holds the database lock.
pub(crate) const SQLITE_BUSY: i32 = 5;
/// A table in the same database is locked.
pub(crate) const SQLITE_LOCKED: i32 = 6;
/// Write attempted through a read-only connection.
pub(crate) const SQLITE_READONLY: i32 = 8;
/// The database file, or its WAL shared-memory file, cannot be opened.
pub(crate) const SQLITE_CANTOPEN: i32 = 14;

/// Primary `SQLite` result code of an engine error.
///
/// sqlx reports the extended code; the low byte is the primary code.
/// Errors that did not come from the engine have no code.
pub(crate) fn sqlite_primary_code(err: &sqlx::Error) -> Option<i32> {
    match err {
        sqlx::Error::Database(db_err) => db_err
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            .map(|code| code & 0xff),
        _ => None,
    }
}
