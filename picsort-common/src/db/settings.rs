//! Settings database operations
//!
//! Provides get/set accessors for the settings table following the
//! key-value pattern. Values are stored as text and parsed on read.

use crate::{Error, Result};
use sqlx::{Pool, Sqlite};

/// Get a setting value, parsed to the requested type
///
/// Returns `Ok(None)` when the key is absent.
pub async fn get_setting<T>(db: &Pool<Sqlite>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await?;

    match row {
        Some((value,)) => value
            .parse::<T>()
            .map(Some)
            .map_err(|e| Error::Config(format!("Setting '{}' is malformed: {}", key, e))),
        None => Ok(None),
    }
}

/// Set a setting value, replacing any existing row
pub async fn set_setting<T: ToString>(db: &Pool<Sqlite>, key: &str, value: T) -> Result<()> {
    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
        .bind(key)
        .bind(value.to_string())
        .execute(db)
        .await?;
    Ok(())
}

/// Session heartbeat timeout, defaulting to 60 seconds
pub async fn get_session_timeout_seconds(db: &Pool<Sqlite>) -> Result<u64> {
    get_setting(db, "session_timeout_seconds")
        .await
        .map(|opt| opt.unwrap_or(60))
}

/// HTTP listen port, defaulting to 5770
pub async fn get_port(db: &Pool<Sqlite>) -> Result<u16> {
    get_setting(db, "port").await.map(|opt| opt.unwrap_or(5770))
}
