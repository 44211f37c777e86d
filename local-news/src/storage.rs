use crate::traits::SlotStorage;
use crate::types::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info};

/// Slot storage backed by a single SQLite table
pub struct SqliteSlotStorage {
    db: Pool<Sqlite>,
}

impl SqliteSlotStorage {
    pub async fn new(database_url: &str) -> Result<Self> {
        // One connection keeps `sqlite::memory:` databases shared across calls
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(database_url)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS slots (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(&db)
        .await?;

        info!("Opened slot storage at {}", database_url);
        Ok(Self { db })
    }
}

#[async_trait]
impl SlotStorage for SqliteSlotStorage {
    fn backend_name(&self) -> String {
        "sqlite".to_string()
    }

    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM slots WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(|row| row.get::<String, _>("value")))
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO slots (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await?;

        debug!("Wrote slot {} ({} bytes)", key, value.len());
        Ok(())
    }
}

/// Process-local slot storage, lost on exit
#[derive(Default)]
pub struct MemorySlotStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemorySlotStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // slot values are replaced whole, so a poisoned map is still usable
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SlotStorage for MemorySlotStorage {
    fn backend_name(&self) -> String {
        "memory".to_string()
    }

    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self.lock().get(key).cloned();
        Ok(value)
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
