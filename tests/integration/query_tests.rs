//! Integration tests for `run_query` and `list_schema`.

use std::time::Duration;

use recon_bridge::format::NO_RESULTS;
use recon_bridge::mcp::tools::{list_schema, run_query};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{ConnectOptions, Connection};

use super::test_helpers::{create_result_table, writer, Workspace};

#[tokio::test]
async fn zero_rows_is_no_results_message() {
    let ws = Workspace::new();
    create_result_table(&ws.store_path(), "example_com", &[]).await;
    let (state, _) = ws.fake_state();

    let reply = run_query::run(&state, "SELECT subdomain FROM example_com").await;
    assert!(!reply.is_error);
    assert_eq!(reply.text, NO_RESULTS);
}

#[tokio::test]
async fn large_result_is_capped_with_note() {
    let ws = Workspace::new();
    let names: Vec<String> = (0..60).map(|i| format!("host{i}.example.com")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    create_result_table(&ws.store_path(), "example_com", &refs).await;
    let (state, _) = ws.fake_state();

    let reply = run_query::run(&state, "SELECT subdomain FROM example_com ORDER BY id").await;
    let lines: Vec<&str> = reply.text.lines().collect();
    assert_eq!(lines[0], "| subdomain |");
    let data_rows = lines
        .iter()
        .skip(2)
        .filter(|line| line.starts_with("| "))
        .count();
    assert_eq!(data_rows, 50);
    assert!(reply.text.contains("10 more rows omitted"));
}

#[tokio::test]
async fn values_render_by_storage_class() {
    let ws = Workspace::new();
    let mut conn = writer(&ws.store_path()).await;
    sqlx::query("CREATE TABLE mixed (t TEXT, i INTEGER, r REAL, b BLOB, n TEXT)")
        .execute(&mut conn)
        .await
        .expect("create");
    sqlx::query("INSERT INTO mixed VALUES ('www', 443, 1.5, x'000102', NULL)")
        .execute(&mut conn)
        .await
        .expect("insert");
    conn.close().await.expect("close");
    let (state, _) = ws.fake_state();

    let reply = run_query::run(&state, "SELECT t, i, r, b, n FROM mixed").await;
    assert!(!reply.is_error, "{}", reply.text);
    assert!(reply
        .text
        .contains("| www | 443 | 1.5 | <blob 3 bytes> | NULL |"));
}

#[tokio::test]
async fn sql_errors_are_reported_verbatim() {
    let ws = Workspace::new();
    create_result_table(&ws.store_path(), "example_com", &["www.example.com"]).await;
    let (state, _) = ws.fake_state();

    let reply = run_query::run(&state, "SELECT * FROM missing_table").await;
    assert!(reply.is_error);
    assert!(reply.text.contains("no such table: missing_table"));
}

#[tokio::test]
async fn whole_reals_keep_their_decimal_point() {
    let ws = Workspace::new();
    let mut conn = writer(&ws.store_path()).await;
    sqlx::query("CREATE TABLE scores (r REAL)")
        .execute(&mut conn)
        .await
        .expect("create");
    sqlx::query("INSERT INTO scores VALUES (2.0)")
        .execute(&mut conn)
        .await
        .expect("insert");
    conn.close().await.expect("close");
    let (state, _) = ws.fake_state();

    let reply = run_query::run(&state, "SELECT r FROM scores").await;
    assert!(!reply.is_error, "{}", reply.text);
    assert!(reply.text.contains("| 2.0 |"), "{}", reply.text);
}

#[tokio::test]
async fn missing_table_named_locked_is_reported_verbatim() {
    let ws = Workspace::new();
    create_result_table(&ws.store_path(), "example_com", &["www.example.com"]).await;
    let (state, _) = ws.fake_state();

    let reply = run_query::run(&state, "SELECT * FROM locked_hosts").await;
    assert!(reply.is_error, "{}", reply.text);
    assert!(reply.text.contains("no such table"), "{}", reply.text);
    assert!(!reply.text.starts_with("Pending"));
}

#[tokio::test]
async fn locked_store_query_is_pending_not_error() {
    let ws = Workspace::new();
    create_result_table(&ws.store_path(), "example_com", &["www.example.com"]).await;
    let (state, _) = ws.fake_state();

    let mut holder = writer(&ws.store_path()).await;
    sqlx::query("BEGIN EXCLUSIVE")
        .execute(&mut holder)
        .await
        .expect("take exclusive lock");

    let reply = tokio::time::timeout(
        Duration::from_secs(10),
        run_query::run(&state, "SELECT subdomain FROM example_com"),
    )
    .await
    .expect("lock wait is bounded");
    assert!(!reply.is_error, "{}", reply.text);
    assert!(reply.text.starts_with("Pending"), "{}", reply.text);
    assert!(reply.text.contains("busy"));

    sqlx::query("ROLLBACK")
        .execute(&mut holder)
        .await
        .expect("release lock");
    holder.close().await.expect("close");
}

#[tokio::test]
async fn wal_store_without_shared_memory_file_still_answers() {
    let ws = Workspace::new();
    let path = ws.store_path();
    std::fs::create_dir_all(path.parent().expect("store dir")).expect("create store dir");
    let mut conn = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .connect()
        .await
        .expect("open wal store");
    sqlx::query("CREATE TABLE example_com (subdomain TEXT)")
        .execute(&mut conn)
        .await
        .expect("create");
    sqlx::query("INSERT INTO example_com VALUES ('www.example.com')")
        .execute(&mut conn)
        .await
        .expect("insert");
    conn.close().await.expect("close");

    for suffix in ["-wal", "-shm"] {
        let mut side = path.clone().into_os_string();
        side.push(suffix);
        let _ = std::fs::remove_file(side);
    }
    let mut shm = path.clone().into_os_string();
    shm.push("-shm");
    assert!(!std::path::Path::new(&shm).exists());

    let (state, _) = ws.fake_state();
    let reply = run_query::run(&state, "SELECT subdomain FROM example_com").await;
    assert!(!reply.is_error, "{}", reply.text);
    assert!(reply.text.contains("www.example.com"));
}

#[tokio::test]
async fn write_statement_falls_back_to_read_write() {
    let ws = Workspace::new();
    create_result_table(&ws.store_path(), "example_com", &["www.example.com"]).await;
    let (state, _) = ws.fake_state();

    let reply = run_query::run(&state, "CREATE TABLE notes (body TEXT)").await;
    assert!(!reply.is_error, "{}", reply.text);
    assert_eq!(reply.text, NO_RESULTS);

    assert!(state.store.table_exists("notes").await.expect("lookup"));
}

#[tokio::test]
async fn missing_store_is_explained() {
    let ws = Workspace::new();
    let (state, _) = ws.fake_state();

    let reply = run_query::run(&state, "SELECT 1").await;
    assert!(reply.is_error);
    assert!(reply.text.contains("does not exist yet"));
    assert!(!ws.store_path().exists());
}

#[tokio::test]
async fn empty_sql_is_invalid_argument() {
    let ws = Workspace::new();
    let (state, _) = ws.fake_state();

    let reply = run_query::run(&state, "  ").await;
    assert!(reply.is_error);
    assert!(reply.text.starts_with("invalid argument"));
}

#[tokio::test]
async fn schema_lists_every_table() {
    let ws = Workspace::new();
    create_result_table(&ws.store_path(), "example_com", &[]).await;
    create_result_table(&ws.store_path(), "example_org", &[]).await;
    let (state, _) = ws.fake_state();

    let reply = list_schema::run(&state).await;
    assert!(!reply.is_error);
    assert!(reply.text.contains("CREATE TABLE example_com"));
    assert!(reply.text.contains("CREATE TABLE example_org"));
    assert!(reply.text.contains("subdomain TEXT"));
}

#[tokio::test]
async fn schema_without_store_is_explained() {
    let ws = Workspace::new();
    let (state, _) = ws.fake_state();

    let reply = list_schema::run(&state).await;
    assert!(reply.is_error);
    assert!(reply.text.contains("launch_scan"));
}
