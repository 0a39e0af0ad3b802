//! libSQL backend: `TokenStore` on a local `settings` table.
//!
//! Supports local file and in-memory databases.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database as LibSqlDatabase, params};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::migrations;
use crate::store::traits::{TOKEN_KEY, TokenStore};

/// libSQL-backed token store.
///
/// Values are stored as JSON text so other settings can share the table.
pub struct LibSqlTokenStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlTokenStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Open(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("Failed to open libSQL database: {e}")))?;

        let store = Self::from_database(db)?;
        migrations::init_schema(&store.conn).await?;
        info!(path = %path.display(), "Token store opened");
        Ok(store)
    }

    /// Create an in-memory store (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("Failed to create in-memory database: {e}")))?;

        let store = Self::from_database(db)?;
        migrations::init_schema(&store.conn).await?;
        Ok(store)
    }

    fn from_database(db: LibSqlDatabase) -> Result<Self, StoreError> {
        let conn = db
            .connect()
            .map_err(|e| StoreError::Open(format!("Failed to create connection: {e}")))?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    async fn get_setting(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let mut rows = self
            .conn
            .query("SELECT value FROM settings WHERE key = ?1", params![key])
            .await
            .map_err(|e| StoreError::Query(format!("get_setting: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let value_str: String = row
                    .get(0)
                    .map_err(|e| StoreError::Query(format!("get_setting: {e}")))?;
                let value = serde_json::from_str(&value_str)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                Ok(Some(value))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(StoreError::Query(format!("get_setting: {e}"))),
        }
    }

    async fn set_setting(&self, key: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        let value_str =
            serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))?;

        self.conn
            .execute(
                "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT (key) DO UPDATE SET value = ?2, updated_at = ?3",
                params![key, value_str, now],
            )
            .await
            .map_err(|e| StoreError::Query(format!("set_setting: {e}")))?;

        Ok(())
    }

    async fn delete_setting(&self, key: &str) -> Result<bool, StoreError> {
        let count = self
            .conn
            .execute("DELETE FROM settings WHERE key = ?1", params![key])
            .await
            .map_err(|e| StoreError::Query(format!("delete_setting: {e}")))?;
        Ok(count > 0)
    }
}

#[async_trait]
impl TokenStore for LibSqlTokenStore {
    async fn get_token(&self) -> Result<Option<SecretString>, StoreError> {
        let token = self
            .get_setting(TOKEN_KEY)
            .await?
            .and_then(|v| v.as_str().map(String::from))
            .filter(|s| !s.is_empty())
            .map(SecretString::from);
        debug!(present = token.is_some(), "Token lookup");
        Ok(token)
    }

    async fn set_token(&self, token: &SecretString) -> Result<(), StoreError> {
        let value = serde_json::Value::String(token.expose_secret().to_string());
        self.set_setting(TOKEN_KEY, &value).await
    }

    async fn clear_token(&self) -> Result<bool, StoreError> {
        self.delete_setting(TOKEN_KEY).await
    }
}
