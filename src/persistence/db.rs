//! `SQLite` connections to the scanner's shared result store.
//!
//! The bridge never creates the store and prefers read-only connections so it
//! does not contend with the scanner's writer. Every connection carries a
//! busy timeout; a held write lock therefore surfaces as a bounded wait
//! followed by `SQLITE_BUSY`, never as an indefinite block.

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::ConnectOptions;

use crate::errors::{sqlite_primary_code, SQLITE_CANTOPEN, SQLITE_READONLY};

/// Connection access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// `SQLITE_OPEN_READONLY`.
    ReadOnly,
    /// Regular read-write connection; still never creates the file.
    ReadWrite,
}

/// Open a single connection to the store at `path`.
///
/// # Errors
///
/// Returns the engine error if the file is missing, cannot be opened in the
/// requested mode, or the lock wait expires.
pub async fn open(
    path: &Path,
    mode: OpenMode,
    lock_timeout: Duration,
) -> sqlx::Result<SqliteConnection> {
    SqliteConnectOptions::new()
        .filename(path)
        .read_only(mode == OpenMode::ReadOnly)
        .create_if_missing(false)
        .busy_timeout(lock_timeout)
        .connect()
        .await
}

/// Whether `err` means the read-only connection cannot serve the request
/// and a read-write connection may succeed.
///
/// Covers statements that write (`SQLITE_READONLY`), and WAL stores whose
/// shared-memory file does not exist yet so a read-only open cannot
/// initialize it (`SQLITE_CANTOPEN`).
#[must_use]
pub fn is_read_only_incompatible(err: &sqlx::Error) -> bool {
    matches!(
        sqlite_primary_code(err),
        Some(SQLITE_READONLY | SQLITE_CANTOPEN)
    )
}
