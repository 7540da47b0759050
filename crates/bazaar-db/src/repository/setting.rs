//! # Setting Repository
//!
//! Plain key/value settings managed from the admin panel.

use sqlx::SqlitePool;
use tracing::warn;

use crate::error::DbResult;
use bazaar_core::SHIPPING_COST_SETTING;

#[derive(Debug, Clone)]
pub struct SettingRepository {
    pool: SqlitePool,
}

impl SettingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingRepository { pool }
    }

    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    /// Inserts or replaces a setting.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES (?1, ?2) ON CONFLICT (key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Flat shipping cost in cents, if configured and well-formed.
    ///
    /// Unparseable or negative values are ignored with a warning.
    pub async fn shipping_cost_cents(&self) -> DbResult<Option<i64>> {
        let Some(raw) = self.get(SHIPPING_COST_SETTING).await? else {
            return Ok(None);
        };

        match raw.trim().parse::<i64>() {
            Ok(cents) if cents >= 0 => Ok(Some(cents)),
            _ => {
                warn!(value = %raw, "Ignoring malformed shipping_cost setting");
                Ok(None)
            }
        }
    }
}
