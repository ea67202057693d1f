//! Hash ledger
//!
//! Durable record of which image content (by SHA-256 hash) has already
//! been used for training, and under which category. Backed by the
//! `training_ledger` table so it survives process restarts; written only
//! as a side effect of a successful commit or of model initialization.

use crate::error::Result;
use sqlx::SqlitePool;
use std::collections::BTreeMap;

/// SQLite-backed hash ledger
#[derive(Clone)]
pub struct HashLedger {
    db: SqlitePool,
}

impl HashLedger {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Whether this exact hash/category pair is already recorded
    ///
    /// A match means the image content was trained on under the same
    /// label and must be excluded from the next incremental fit.
    pub async fn contains(&self, content_hash: &str, category: &str) -> Result<bool> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM training_ledger WHERE content_hash = ? AND category = ?",
        )
        .bind(content_hash)
        .bind(category)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.is_some())
    }

    /// Record or re-label one trained image
    pub async fn upsert(&self, content_hash: &str, category: &str) -> Result<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO training_ledger (content_hash, category, trained_at) \
             VALUES (?, ?, ?)",
        )
        .bind(content_hash)
        .bind(category)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.db)
        .await?;
        Ok(())
    }

    /// Full ledger contents as hash -> category
    pub async fn snapshot(&self) -> Result<BTreeMap<String, String>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT content_hash, category FROM training_ledger")
                .fetch_all(&self.db)
                .await?;
        Ok(rows.into_iter().collect())
    }

    /// Replace the whole ledger with a fresh scan (initialization only)
    pub async fn replace_all(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let mut tx = self.db.begin().await?;
        sqlx::query("DELETE FROM training_ledger").execute(&mut *tx).await?;
        let trained_at = chrono::Utc::now().to_rfc3339();
        for (content_hash, category) in entries {
            sqlx::query(
                "INSERT INTO training_ledger (content_hash, category, trained_at) \
                 VALUES (?, ?, ?)",
            )
            .bind(content_hash)
            .bind(category)
            .bind(&trained_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picsort_common::db::init_database;
    use tempfile::TempDir;

    async fn ledger() -> (TempDir, HashLedger) {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("picsort.db")).await.unwrap();
        (dir, HashLedger::new(pool))
    }

    #[tokio::test]
    async fn test_upsert_and_contains() {
        let (_dir, ledger) = ledger().await;

        assert!(!ledger.contains("h1", "cats").await.unwrap());
        ledger.upsert("h1", "cats").await.unwrap();
        assert!(ledger.contains("h1", "cats").await.unwrap());

        // Same hash under a different category is not a match
        assert!(!ledger.contains("h1", "dogs").await.unwrap());
    }

    #[tokio::test]
    async fn test_upsert_relabels_existing_hash() {
        let (_dir, ledger) = ledger().await;
        ledger.upsert("h1", "cats").await.unwrap();
        ledger.upsert("h1", "dogs").await.unwrap();

        assert!(!ledger.contains("h1", "cats").await.unwrap());
        assert!(ledger.contains("h1", "dogs").await.unwrap());
        assert_eq!(ledger.snapshot().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_replace_all() {
        let (_dir, ledger) = ledger().await;
        ledger.upsert("old", "cats").await.unwrap();

        let fresh: BTreeMap<String, String> = [
            ("h1".to_string(), "cats".to_string()),
            ("h2".to_string(), "dogs".to_string()),
        ]
        .into_iter()
        .collect();
        ledger.replace_all(&fresh).await.unwrap();

        assert_eq!(ledger.snapshot().await.unwrap(), fresh);
        assert!(!ledger.contains("old", "cats").await.unwrap());
    }
}
