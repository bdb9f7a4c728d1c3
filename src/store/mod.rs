//! Key-value persistence seam.
//!
//! Everything the backend persists (mastery counters, the last response per
//! item, generated items) goes through two operations: upsert-by-key and
//! read-by-key. [`SqliteKvStore`] implements them over the `kv_store` table.

mod error;

pub use error::{StoreDbErrorKind, StoreError};

use async_trait::async_trait;
use serde_json::Value;
use sqlx::Row;
use tracing::{instrument, warn};

use crate::db::Database;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Data-access contract for JSON values stored by key.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Inserts or replaces the value stored under `key`.
    async fn upsert(&self, key: &str, value: &Value) -> Result<()>;

    /// Reads the value stored under `key`.
    async fn read(&self, key: &str) -> Result<Option<Value>>;
}

/// `SQLite`-backed [`KvStore`].
#[derive(Debug, Clone)]
pub struct SqliteKvStore {
    db: Database,
}

impl SqliteKvStore {
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn check_key(key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(StoreError::invalid_key("key is blank"));
    }
    Ok(())
}

#[async_trait]
impl KvStore for SqliteKvStore {
    #[instrument(skip(self, value), fields(key = %key))]
    async fn upsert(&self, key: &str, value: &Value) -> Result<()> {
        check_key(key)?;
        let encoded =
            serde_json::to_string(value).map_err(|err| StoreError::corrupt_value(key, &err))?;

        sqlx::query(
            r"INSERT INTO kv_store (key, value, updated_at)
              VALUES (?, ?, datetime('now'))
              ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(encoded)
        .execute(self.db.pool())
        .await
        .inspect_err(|err| warn!(error = %err, "Store upsert failed"))?;

        Ok(())
    }

    #[instrument(skip(self), fields(key = %key))]
    async fn read(&self, key: &str) -> Result<Option<Value>> {
        check_key(key)?;
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(self.db.pool())
            .await
            .inspect_err(|err| warn!(error = %err, "Store read failed"))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let raw: String = row.get("value");
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| StoreError::corrupt_value(key, &err))
    }
}
