//! Key-value slots holding whole JSON documents.
//!
//! Each store owns one fixed key, reads its document once at startup and
//! rewrites it wholesale after every mutation.

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;

/// Fixed keys of the persisted documents.
pub mod keys {
    pub const SESSIONS: &str = "messmate-sessions";
    pub const USERS: &str = "messmate-mock-users";
    pub const MEALS: &str = "messmate-meals";
    pub const WEEKLY_MENU: &str = "messmate-weekly-menu";
    pub const NOTIFICATIONS: &str = "messmate-notifications";
    pub const FEEDBACK: &str = "messmate-feedback";
    pub const BILLS: &str = "messmate-uploaded-bills";
    pub const THEME: &str = "messmate-theme";
}

/// Outcome of reading a JSON slot.
#[derive(Debug)]
pub enum Loaded<T> {
    /// Nothing stored under the key yet
    Missing,
    /// Stored value did not parse; already logged
    Corrupt,
    Value(T),
}

impl<T> Loaded<T> {
    /// Collapse missing and corrupt slots into `None`.
    pub fn ok(self) -> Option<T> {
        match self {
            Loaded::Value(v) => Some(v),
            Loaded::Missing | Loaded::Corrupt => None,
        }
    }
}

/// SQLite-backed key-value store.
#[derive(Clone)]
pub struct KvStore {
    pool: SqlitePool,
}

impl KvStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Read the raw string stored under `key`.
    pub async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get("value")))
    }

    /// Store `value` under `key`, replacing what was there.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete the slot. Missing keys are not an error.
    pub async fn remove(&self, key: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Read and parse the JSON document under `key`.
    ///
    /// Parse failures are logged and reported as [`Loaded::Corrupt`] so the
    /// caller can fall back to its default state.
    pub async fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Loaded<T>, AppError> {
        let Some(raw) = self.get(key).await? else {
            return Ok(Loaded::Missing);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Loaded::Value(value)),
            Err(e) => {
                tracing::error!("Failed to parse stored document {}: {}", key, e);
                Ok(Loaded::Corrupt)
            }
        }
    }

    /// Serialize `value` and overwrite the document under `key`.
    pub async fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw).await
    }
}
