//! Integration tests for database initialization
//!
//! Tests cover:
//! - Database creation on first run
//! - Idempotent re-initialization against an existing file
//! - Default settings and typed accessors
//! - training_ledger table shape

use picsort_common::db::{
    get_port, get_session_timeout_seconds, get_setting, init_database, set_setting,
};
use tempfile::TempDir;

#[tokio::test]
async fn test_init_creates_database_file() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("picsort.db");

    assert!(!db_path.exists());
    let _pool = init_database(&db_path).await.unwrap();
    assert!(db_path.exists());
}

#[tokio::test]
async fn test_init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("picsort.db");

    let pool = init_database(&db_path).await.unwrap();
    set_setting(&pool, "session_timeout_seconds", 120u64)
        .await
        .unwrap();
    pool.close().await;

    // Second init must not clobber existing settings
    let pool = init_database(&db_path).await.unwrap();
    assert_eq!(get_session_timeout_seconds(&pool).await.unwrap(), 120);
}

#[tokio::test]
async fn test_default_settings_present() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("picsort.db")).await.unwrap();

    assert_eq!(get_session_timeout_seconds(&pool).await.unwrap(), 60);
    assert_eq!(get_port(&pool).await.unwrap(), 5770);
}

#[tokio::test]
async fn test_get_setting_absent_key_is_none() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("picsort.db")).await.unwrap();

    let value: Option<String> = get_setting(&pool, "no_such_key").await.unwrap();
    assert!(value.is_none());
}

#[tokio::test]
async fn test_get_setting_malformed_value_errors() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("picsort.db")).await.unwrap();

    set_setting(&pool, "session_timeout_seconds", "not-a-number")
        .await
        .unwrap();
    let result: picsort_common::Result<Option<u64>> =
        get_setting(&pool, "session_timeout_seconds").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_training_ledger_table_exists() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("picsort.db")).await.unwrap();

    sqlx::query("INSERT INTO training_ledger (content_hash, category, trained_at) VALUES (?, ?, ?)")
        .bind("abc123")
        .bind("cats")
        .bind("2026-01-01T00:00:00Z")
        .execute(&pool)
        .await
        .unwrap();

    let (category,): (String,) =
        sqlx::query_as("SELECT category FROM training_ledger WHERE content_hash = ?")
            .bind("abc123")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(category, "cats");
}
