// src/profile_gate/store.rs
//! Client-local key/value storage and the completion cache built on top of it

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::debug;

use super::models::PersistedCompletionRecord;

pub const PROFILE_COMPLETED_KEY: &str = "profileCompleted";
pub const USER_BLOB_KEY: &str = "user";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Malformed record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

// ============================================================================
// Key/Value Storage
// ============================================================================

/// Plain string key/value storage, one namespace per browser client
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-process storage, used by tests and when no database is configured
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory storage lock poisoned".to_string()))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// SQLite-backed storage in the `client_storage` table, scoped per client
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
    scope: String,
}

impl SqliteStorage {
    pub fn new(pool: SqlitePool, scope: impl Into<String>) -> Self {
        Self {
            pool,
            scope: scope.into(),
        }
    }
}

#[async_trait]
impl KeyValueStore for SqliteStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT value FROM client_storage WHERE scope = ? AND key = ?",
        )
        .bind(&self.scope)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO client_storage (scope, key, value, updated_at)
            VALUES (?, ?, ?, datetime('now'))
            ON CONFLICT(scope, key) DO UPDATE SET
                value = excluded.value,
                updated_at = datetime('now')
            "#,
        )
        .bind(&self.scope)
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        debug!(scope = %self.scope, key = %key, "Client storage entry written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM client_storage WHERE scope = ? AND key = ?")
            .bind(&self.scope)
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// ============================================================================
// Completion Cache
// ============================================================================

/// Accessor for the persisted completion record
#[async_trait]
pub trait PersistedCompletionStore: Send + Sync {
    async fn read(&self) -> Result<Option<PersistedCompletionRecord>, StoreError>;
    async fn write(&self, record: &PersistedCompletionRecord) -> Result<(), StoreError>;
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Stores the record as JSON under `profileCompleted`
#[derive(Clone)]
pub struct CompletionCache {
    storage: Arc<dyn KeyValueStore>,
}

impl CompletionCache {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl PersistedCompletionStore for CompletionCache {
    async fn read(&self) -> Result<Option<PersistedCompletionRecord>, StoreError> {
        match self.storage.get(PROFILE_COMPLETED_KEY).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn write(&self, record: &PersistedCompletionRecord) -> Result<(), StoreError> {
        let raw = serde_json::to_string(record)?;
        self.storage.set(PROFILE_COMPLETED_KEY, &raw).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.storage.remove(PROFILE_COMPLETED_KEY).await
    }
}

/// Raw user blob kept for the OAuth display-name fallback
#[derive(Clone)]
pub struct UserBlobCache {
    storage: Arc<dyn KeyValueStore>,
}

impl UserBlobCache {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    pub async fn save(&self, user: &serde_json::Value) -> Result<(), StoreError> {
        self.storage
            .set(USER_BLOB_KEY, &serde_json::to_string(user)?)
            .await
    }

    /// Best display name from the cached blob: `name`, then first/last, then email
    pub async fn display_name(&self) -> Option<String> {
        let raw = self.storage.get(USER_BLOB_KEY).await.ok()??;
        let blob: serde_json::Value = serde_json::from_str(&raw).ok()?;

        let field = |key: &str| {
            blob.get(key)
                .and_then(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        if let Some(name) = field("name") {
            return Some(name);
        }

        let first = field("firstName").or_else(|| field("first_name"));
        let last = field("lastName").or_else(|| field("last_name"));
        match (first, last) {
            (Some(f), Some(l)) => Some(format!("{} {}", f, l)),
            (Some(f), None) => Some(f),
            (None, Some(l)) => Some(l),
            (None, None) => field("email"),
        }
    }
}
