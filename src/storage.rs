use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;
use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// JSON-array slots in the `kv_store` table.
#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
    write_lock: Arc<Mutex<()>>,
}

impl Storage {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Held across a load/modify/save cycle. Other processes sharing the
    /// database are not covered; between them the last write wins.
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    /// Elements stored under `key`. A missing slot, an unreadable slot and a
    /// slot that is not a JSON array all read as empty.
    pub async fn load(&self, key: &str) -> Vec<Value> {
        self.try_load(key).await.unwrap_or_default()
    }

    /// Like [`Storage::load`], but a slot that cannot be read, or whose bad
    /// text cannot be moved aside, is an error. Anything that writes the slot
    /// back must load through here.
    pub async fn try_load(&self, key: &str) -> Result<Vec<Value>, StorageError> {
        let text = match self.read_text(key).await {
            Ok(Some(text)) => text,
            Ok(None) => {
                log::debug!(target: "storage", "slot {key} not written yet");
                return Ok(Vec::new());
            }
            Err(err) => {
                log::error!(target: "storage", "failed to read slot {key}: {err}");
                return Err(err.into());
            }
        };

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(items)) => Ok(items),
            Ok(other) => {
                log::error!(
                    target: "storage",
                    "slot {key} holds {} instead of an array; moving it aside",
                    json_kind(&other)
                );
                self.quarantine_text(key, &text).await?;
                Ok(Vec::new())
            }
            Err(err) => {
                log::error!(target: "storage", "slot {key} is not valid JSON: {err}; moving it aside");
                self.quarantine_text(key, &text).await?;
                Ok(Vec::new())
            }
        }
    }

    pub async fn save(&self, key: &str, items: &[Value]) -> Result<(), StorageError> {
        let result = self.write(key, items).await;
        if let Err(err) = &result {
            log::error!(target: "storage", "failed to save slot {key}: {err}");
        }
        result
    }

    /// Appends undecodable elements to `<key>.rejected`. The caller must not
    /// drop them from `key` unless this succeeds.
    pub async fn reject(&self, key: &str, items: Vec<Value>) -> Result<(), StorageError> {
        if items.is_empty() {
            return Ok(());
        }
        let rejected_key = format!("{key}.rejected");
        log::warn!(
            target: "storage",
            "moving {} malformed record(s) from {key} to {rejected_key}",
            items.len()
        );
        let mut existing = self.try_load(&rejected_key).await?;
        existing.extend(items);
        self.save(&rejected_key, &existing).await
    }

    async fn read_text(&self, key: &str) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ? LIMIT 1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
    }

    async fn write(&self, key: &str, items: &[Value]) -> Result<(), StorageError> {
        let text = serde_json::to_string(items)?;
        self.write_text(key, &text).await?;
        Ok(())
    }

    async fn write_text(&self, key: &str, text: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"INSERT INTO kv_store (key, value, updated_at)
               VALUES (?, ?, ?)
               ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(key)
        .bind(text)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Copies bad slot text to `<key>.corrupt`, then resets the slot. The
    /// slot is left as it was if the copy fails.
    async fn quarantine_text(&self, key: &str, text: &str) -> Result<(), StorageError> {
        let corrupt_key = format!("{key}.corrupt");
        if let Err(err) = self.write_text(&corrupt_key, text).await {
            log::error!(target: "storage", "failed to keep unreadable slot {key}: {err}");
            return Err(err.into());
        }
        if let Err(err) = self.write_text(key, "[]").await {
            log::error!(target: "storage", "failed to reset slot {key}: {err}");
            return Err(err.into());
        }
        Ok(())
    }

    #[cfg(test)]
    pub async fn put_raw(&self, key: &str, text: &str) {
        self.write_text(key, text).await.unwrap();
    }

    #[cfg(test)]
    pub async fn get_raw(&self, key: &str) -> Option<String> {
        self.read_text(key).await.unwrap()
    }

    /// Stores bytes the text reader cannot decode.
    #[cfg(test)]
    pub async fn put_blob(&self, key: &str, bytes: &[u8]) {
        sqlx::query("INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)")
            .bind(key)
            .bind(bytes)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .unwrap();
    }

    #[cfg(test)]
    pub async fn get_blob(&self, key: &str) -> Option<Vec<u8>> {
        sqlx::query_scalar::<_, Vec<u8>>("SELECT value FROM kv_store WHERE key = ? LIMIT 1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .unwrap()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
