//! Shared test helpers for integration tests.
//!
//! Builds a throwaway tools root with fake scanner scripts, an `AppState`
//! wired to either a recording spawner or the real detached one, and
//! `SQLite` stores shaped like the subdomain scanner's output.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use recon_bridge::config::GlobalConfig;
use recon_bridge::jobs::registry::TrackedProcess;
use recon_bridge::jobs::spawner::{DetachedSpawner, Invocation, ProcessSpawner};
use recon_bridge::mcp::handler::AppState;
use recon_bridge::models::job::JobState;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode};
use sqlx::{ConnectOptions, Connection};
use tempfile::TempDir;

/// Temporary tools root with both scanner directories laid out.
pub struct Workspace {
    pub dir: TempDir,
    pub config: GlobalConfig,
}

impl Workspace {
    /// Tools root with placeholder scanner scripts run through `sh`.
    pub fn new() -> Self {
        Self::with_scripts("exit 0\n", "exit 0\n")
    }

    /// Tools root whose scanner scripts have the given `sh` bodies.
    pub fn with_scripts(subdomain_body: &str, directory_body: &str) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().to_string_lossy().replace('\\', "/");
        let toml = format!(
            r#"
tools_root = '{root}'
lock_timeout_seconds = 1
self_test_timeout_seconds = 2

[subdomain]
interpreter = "sh"
script = "fake_oneforall.sh"

[directory]
interpreter = "sh"
script = "fake_dirsearch.sh"
"#
        );
        let config = GlobalConfig::from_toml_str(&toml).expect("valid test config");

        write_script(&dir.path().join("OneForAll"), "fake_oneforall.sh", subdomain_body);
        write_script(&dir.path().join("dirsearch"), "fake_dirsearch.sh", directory_body);

        Self { dir, config }
    }

    pub fn store_path(&self) -> PathBuf {
        self.config.store_path().to_path_buf()
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.config.reports_dir().to_path_buf()
    }

    /// State backed by the recording spawner.
    pub fn fake_state(&self) -> (Arc<AppState>, Arc<FakeSpawner>) {
        let spawner = Arc::new(FakeSpawner::new());
        let state = AppState::with_spawner(
            self.config.clone(),
            Arc::clone(&spawner) as Arc<dyn ProcessSpawner>,
        );
        (Arc::new(state), spawner)
    }

    /// State that starts real detached processes.
    pub fn real_state(&self) -> Arc<AppState> {
        Arc::new(AppState::with_spawner(
            self.config.clone(),
            Arc::new(DetachedSpawner),
        ))
    }
}

fn write_script(dir: &Path, name: &str, body: &str) {
    std::fs::create_dir_all(dir).expect("create tool dir");
    std::fs::write(dir.join(name), body).expect("write script");
}

/// Spawner that records invocations instead of starting processes.
pub struct FakeSpawner {
    spawned: AtomicUsize,
    alive: Arc<AtomicBool>,
    last: Mutex<Option<Invocation>>,
}

impl FakeSpawner {
    pub fn new() -> Self {
        Self {
            spawned: AtomicUsize::new(0),
            alive: Arc::new(AtomicBool::new(true)),
            last: Mutex::new(None),
        }
    }

    pub fn spawn_count(&self) -> usize {
        self.spawned.load(Ordering::SeqCst)
    }

    /// Mark every process handed out so far as exited or running.
    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::SeqCst);
    }

    pub fn last_invocation(&self) -> Option<Invocation> {
        self.last.lock().expect("lock").clone()
    }
}

impl ProcessSpawner for FakeSpawner {
    fn spawn(&self, invocation: &Invocation) -> recon_bridge::Result<Box<dyn TrackedProcess>> {
        let n = self.spawned.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().expect("lock") = Some(invocation.clone());
        let pid = 4000 + u32::try_from(n).expect("small count");
        Ok(Box::new(FakeProcess {
            pid,
            alive: Arc::clone(&self.alive),
        }))
    }
}

struct FakeProcess {
    pid: u32,
    alive: Arc<AtomicBool>,
}

impl TrackedProcess for FakeProcess {
    fn id(&self) -> Option<u32> {
        Some(self.pid)
    }

    fn poll(&mut self) -> JobState {
        if self.alive.load(Ordering::SeqCst) {
            JobState::Running
        } else {
            JobState::Exited(Some(0))
        }
    }
}

/// Open (creating if needed) a read-write connection the way the scanner would.
pub async fn writer(path: &Path) -> SqliteConnection {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create store dir");
    }
    SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Delete)
        .connect()
        .await
        .expect("open store for writing")
}

/// Create a result table shaped like the subdomain scanner's output.
pub async fn create_result_table(path: &Path, table: &str, subdomains: &[&str]) {
    let mut conn = writer(path).await;
    sqlx::query(&format!(
        "CREATE TABLE {table} (id INTEGER PRIMARY KEY, subdomain TEXT, ip TEXT, port INTEGER, alive INTEGER)"
    ))
    .execute(&mut conn)
    .await
    .expect("create table");
    for (i, subdomain) in subdomains.iter().enumerate() {
        sqlx::query(&format!(
            "INSERT INTO {table} (subdomain, ip, port, alive) VALUES (?1, ?2, 443, 1)"
        ))
        .bind(*subdomain)
        .bind(format!("10.0.0.{i}"))
        .execute(&mut conn)
        .await
        .expect("insert row");
    }
    conn.close().await.expect("close store");
}

/// Create an empty store file with no tables.
pub async fn create_empty_store(path: &Path) {
    let mut conn = writer(path).await;
    sqlx::query("PRAGMA user_version = 1")
        .execute(&mut conn)
        .await
        .expect("touch store");
    conn.close().await.expect("close store");
}
