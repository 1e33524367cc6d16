//! Read access to the shared scan result store.
//!
//! Queries are executed verbatim. The caller is the analysis agent working on
//! its own scan data, so no filtering or rewriting is applied to the SQL text.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Connection, Row, TypeInfo, ValueRef};
use tracing::{debug, warn};

use super::db::{self, OpenMode};
use crate::Result;

/// Text rendered for SQL `NULL` values.
pub const NULL_TEXT: &str = "NULL";

/// Full result set of a query, every value already in display form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOutput {
    /// Column names in select order; empty when no rows were returned.
    pub columns: Vec<String>,
    /// One entry per row, aligned with `columns`.
    pub rows: Vec<Vec<String>>,
}

impl QueryOutput {
    /// Number of rows returned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the query returned no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Handle to the store file written by the subdomain scanner.
#[derive(Debug, Clone)]
pub struct ResultStore {
    path: PathBuf,
    lock_timeout: Duration,
}

impl ResultStore {
    /// Create a handle; nothing is opened until a query runs.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, lock_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            lock_timeout,
        }
    }

    /// Location of the store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the scanner has created the store file yet.
    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Execute `sql` and return every row with its column names.
    ///
    /// Runs on a read-only connection first and retries once on a
    /// read-write connection if the read-only one cannot serve the query.
    ///
    /// # Errors
    ///
    /// Returns `AppError::StoreBusy` if the lock wait expires, or
    /// `AppError::Store` with the engine's message for any other failure.
    pub async fn query(&self, sql: &str) -> Result<QueryOutput> {
        self.with_fallback(|mode| self.fetch_rows(sql, mode)).await
    }

    /// Whether a table named exactly `table` exists. Never creates anything.
    ///
    /// # Errors
    ///
    /// Same as [`ResultStore::query`].
    pub async fn table_exists(&self, table: &str) -> Result<bool> {
        self.with_fallback(|mode| self.lookup_table(table, mode))
            .await
    }

    /// `CREATE TABLE` statements for every table in the store, uncapped.
    ///
    /// # Errors
    ///
    /// Same as [`ResultStore::query`].
    pub async fn table_definitions(&self) -> Result<Vec<String>> {
        self.with_fallback(|mode| self.fetch_definitions(mode))
            .await
    }

    async fn with_fallback<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: Fn(OpenMode) -> Fut,
        Fut: Future<Output = sqlx::Result<T>>,
    {
        let outcome = match op(OpenMode::ReadOnly).await {
            Err(err) if db::is_read_only_incompatible(&err) => {
                warn!(%err, store = %self.path.display(), "read-only access failed, retrying read-write");
                op(OpenMode::ReadWrite).await
            }
            other => other,
        };
        Ok(outcome?)
    }

    async fn fetch_rows(&self, sql: &str, mode: OpenMode) -> sqlx::Result<QueryOutput> {
        let mut conn = db::open(&self.path, mode, self.lock_timeout).await?;
        let fetched = sqlx::query(sql).fetch_all(&mut conn).await;
        let _ = conn.close().await;
        let rows = fetched?;

        let columns = rows
            .first()
            .map(|row| {
                row.columns()
                    .iter()
                    .map(|column| column.name().to_owned())
                    .collect()
            })
            .unwrap_or_default();

        let rows = rows.iter().map(render_row).collect::<sqlx::Result<Vec<_>>>()?;
        debug!(rows = rows.len(), ?mode, "query executed");

        Ok(QueryOutput { columns, rows })
    }

    async fn lookup_table(&self, table: &str, mode: OpenMode) -> sqlx::Result<bool> {
        let mut conn = db::open(&self.path, mode, self.lock_timeout).await?;
        let found = sqlx::query("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")
            .bind(table)
            .fetch_optional(&mut conn)
            .await;
        let _ = conn.close().await;
        Ok(found?.is_some())
    }

    async fn fetch_definitions(&self, mode: OpenMode) -> sqlx::Result<Vec<String>> {
        let mut conn = db::open(&self.path, mode, self.lock_timeout).await?;
        let fetched: sqlx::Result<Vec<(Option<String>,)>> =
            sqlx::query_as("SELECT sql FROM sqlite_master WHERE type = 'table' ORDER BY name")
                .fetch_all(&mut conn)
                .await;
        let _ = conn.close().await;
        Ok(fetched?.into_iter().filter_map(|(sql,)| sql).collect())
    }
}

fn render_row(row: &SqliteRow) -> sqlx::Result<Vec<String>> {
    (0..row.len()).map(|index| render_value(row, index)).collect()
}

/// Display form of one value, decoded by its runtime storage class.
fn render_value(row: &SqliteRow, index: usize) -> sqlx::Result<String> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(NULL_TEXT.to_owned());
    }
    let storage = raw.type_info().name().to_owned();

    let text = match storage.as_str() {
        "INTEGER" | "BOOLEAN" => row.try_get_unchecked::<i64, _>(index)?.to_string(),
        "REAL" => format!("{:?}", row.try_get_unchecked::<f64, _>(index)?),
        "BLOB" => {
            let bytes: Vec<u8> = row.try_get_unchecked(index)?;
            format!("<blob {} bytes>", bytes.len())
        }
        _ => row.try_get_unchecked::<String, _>(index)?,
    };

    Ok(text)
}
