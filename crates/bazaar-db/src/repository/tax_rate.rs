//! # Tax Rate Repository
//!
//! Stores location-keyed tax rules. At most one row is the default; setting
//! a new default clears the old flag in the same transaction (a partial
//! unique index backs this up).

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::info;

use crate::error::{DbError, DbResult};
use bazaar_core::TaxRateRule;

const TAX_COLUMNS: &str = "id, country, region, city, rate_bps, is_default, created_at, updated_at";

/// Repository for tax rate rules.
#[derive(Debug, Clone)]
pub struct TaxRateRepository {
    pool: SqlitePool,
}

impl TaxRateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TaxRateRepository { pool }
    }

    /// Rules that can match an address in `country`, plus the default row.
    ///
    /// Oldest first, so the resolver's first-match is deterministic.
    pub async fn candidates(&self, country: &str) -> DbResult<Vec<TaxRateRule>> {
        let sql = format!(
            r#"
            SELECT {} FROM tax_rates
            WHERE lower(trim(country)) = lower(trim(?1)) OR is_default = 1
            ORDER BY created_at, id
            "#,
            TAX_COLUMNS
        );
        let rules = sqlx::query_as::<_, TaxRateRule>(&sql)
            .bind(country)
            .fetch_all(&self.pool)
            .await?;

        Ok(rules)
    }

    /// Lists all rules: default first, then by country, region and city.
    pub async fn list(&self) -> DbResult<Vec<TaxRateRule>> {
        let sql = format!(
            "SELECT {} FROM tax_rates ORDER BY is_default DESC, country, region, city",
            TAX_COLUMNS
        );
        let rules = sqlx::query_as::<_, TaxRateRule>(&sql).fetch_all(&self.pool).await?;

        Ok(rules)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<TaxRateRule>> {
        let sql = format!("SELECT {} FROM tax_rates WHERE id = ?1", TAX_COLUMNS);
        let rule = sqlx::query_as::<_, TaxRateRule>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(rule)
    }

    /// Inserts a rule. If it is the default, the previous default is cleared first.
    pub async fn create(&self, rule: &TaxRateRule) -> DbResult<()> {
        info!(country = %rule.country, region = %rule.region, city = %rule.city, "Creating tax rate");

        let mut tx = self.pool.begin().await?;
        if rule.is_default {
            clear_default(&mut tx).await?;
        }

        sqlx::query(
            r#"
            INSERT INTO tax_rates (id, country, region, city, rate_bps, is_default, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&rule.id)
        .bind(&rule.country)
        .bind(&rule.region)
        .bind(&rule.city)
        .bind(rule.rate_bps)
        .bind(rule.is_default)
        .bind(rule.created_at)
        .bind(rule.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Updates a rule. If it becomes the default, the previous default is cleared.
    pub async fn update(&self, rule: &TaxRateRule) -> DbResult<()> {
        info!(id = %rule.id, "Updating tax rate");

        let mut tx = self.pool.begin().await?;
        if rule.is_default {
            clear_default(&mut tx).await?;
        }

        let result = sqlx::query(
            r#"
            UPDATE tax_rates SET
                country = ?1, region = ?2, city = ?3, rate_bps = ?4, is_default = ?5, updated_at = ?6
            WHERE id = ?7
            "#,
        )
        .bind(&rule.country)
        .bind(&rule.region)
        .bind(&rule.city)
        .bind(rule.rate_bps)
        .bind(rule.is_default)
        .bind(Utc::now())
        .bind(&rule.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("TaxRate", &rule.id));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Makes `id` the only default rule.
    pub async fn set_default(&self, id: &str) -> DbResult<()> {
        info!(id = %id, "Setting default tax rate");

        let mut tx = self.pool.begin().await?;
        clear_default(&mut tx).await?;

        let result = sqlx::query("UPDATE tax_rates SET is_default = 1, updated_at = ?1 WHERE id = ?2")
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("TaxRate", id));
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        info!(id = %id, "Deleting tax rate");

        let result = sqlx::query("DELETE FROM tax_rates WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("TaxRate", id));
        }

        Ok(())
    }
}

async fn clear_default(tx: &mut Transaction<'_, Sqlite>) -> DbResult<()> {
    sqlx::query("UPDATE tax_rates SET is_default = 0, updated_at = ?1 WHERE is_default = 1")
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
