use sqlx::SqlitePool;

use crate::error::StoreError;

const KEY_LAST_SYNC_TIME: &str = "last_sync_time";
const KEY_NOTIFICATIONS_ENABLED: &str = "notifications_enabled";
const KEY_FIRST_LAUNCH: &str = "first_launch";

/// Key-value settings stored next to the feature table.
#[derive(Debug, Clone)]
pub struct Preferences {
    pool: SqlitePool,
}

impl Preferences {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Milliseconds since the Unix epoch of the last successful sync, 0 if never.
    pub async fn last_sync_time(&self) -> Result<i64, StoreError> {
        Ok(self
            .get(KEY_LAST_SYNC_TIME)
            .await?
            .and_then(|v| v.parse().ok())
            .unwrap_or(0))
    }

    pub async fn set_last_sync_time(&self, timestamp: i64) -> Result<(), StoreError> {
        self.set(KEY_LAST_SYNC_TIME, &timestamp.to_string()).await
    }

    pub async fn notifications_enabled(&self) -> Result<bool, StoreError> {
        self.get_bool(KEY_NOTIFICATIONS_ENABLED, true).await
    }

    pub async fn set_notifications_enabled(&self, enabled: bool) -> Result<(), StoreError> {
        self.set(KEY_NOTIFICATIONS_ENABLED, &enabled.to_string())
            .await
    }

    pub async fn is_first_launch(&self) -> Result<bool, StoreError> {
        self.get_bool(KEY_FIRST_LAUNCH, true).await
    }

    pub async fn set_first_launch(&self, first_launch: bool) -> Result<(), StoreError> {
        self.set(KEY_FIRST_LAUNCH, &first_launch.to_string()).await
    }

    /// Removes every stored setting so all getters return their defaults.
    pub async fn clear_all(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM preferences")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_bool(&self, key: &str, default: bool) -> Result<bool, StoreError> {
        Ok(self
            .get(key)
            .await?
            .and_then(|v| v.parse().ok())
            .unwrap_or(default))
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM preferences WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.0))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO preferences (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
