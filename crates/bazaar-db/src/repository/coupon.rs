//! # Coupon Repository
//!
//! ## Guarded Redemption
//! ```text
//! UPDATE coupons SET used_count = used_count + 1
//! WHERE id = ? AND is_active = 1 AND (usage_limit = 0 OR used_count < usage_limit)
//! ```
//! The cap is re-checked by the write itself, so N concurrent orders can
//! never push `used_count` past `usage_limit`. A `false` return means the
//! coupon was exhausted (or deactivated) after the caller priced the order.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use bazaar_core::Coupon;

const COUPON_COLUMNS: &str = r#"
    id, code, discount_type, value, min_purchase_cents, max_discount_cents,
    usage_limit, used_count, valid_from, valid_until, is_active, created_at, updated_at
"#;

/// Repository for coupons.
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    /// Looks a coupon up by its exact code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        let sql = format!("SELECT {} FROM coupons WHERE code = ?1", COUPON_COLUMNS);
        let coupon = sqlx::query_as::<_, Coupon>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(coupon)
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<Coupon>> {
        let sql = format!("SELECT {} FROM coupons WHERE id = ?1", COUPON_COLUMNS);
        let coupon = sqlx::query_as::<_, Coupon>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(coupon)
    }

    /// Lists all coupons, newest first.
    pub async fn list(&self) -> DbResult<Vec<Coupon>> {
        let sql = format!("SELECT {} FROM coupons ORDER BY created_at DESC, code", COUPON_COLUMNS);
        let coupons = sqlx::query_as::<_, Coupon>(&sql).fetch_all(&self.pool).await?;

        Ok(coupons)
    }

    /// Consumes one use of the coupon. Returns `false` when the cap was hit.
    pub async fn redeem(&self, tx: &mut Transaction<'_, Sqlite>, id: &str) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE coupons
            SET used_count = used_count + 1, updated_at = ?1
            WHERE id = ?2 AND is_active = 1 AND (usage_limit = 0 OR used_count < usage_limit)
            "#,
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&mut **tx)
        .await?;

        let redeemed = result.rows_affected() == 1;
        debug!(coupon_id = %id, redeemed, "Coupon redemption attempted");
        Ok(redeemed)
    }

    pub async fn insert(&self, coupon: &Coupon) -> DbResult<()> {
        info!(code = %coupon.code, "Creating coupon");

        sqlx::query(
            r#"
            INSERT INTO coupons (
                id, code, discount_type, value, min_purchase_cents, max_discount_cents,
                usage_limit, used_count, valid_from, valid_until, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&coupon.id)
        .bind(&coupon.code)
        .bind(coupon.discount_type)
        .bind(coupon.value)
        .bind(coupon.min_purchase_cents)
        .bind(coupon.max_discount_cents)
        .bind(coupon.usage_limit)
        .bind(coupon.used_count)
        .bind(coupon.valid_from)
        .bind(coupon.valid_until)
        .bind(coupon.is_active)
        .bind(coupon.created_at)
        .bind(coupon.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &coupon.code),
            other => other,
        })?;

        Ok(())
    }

    /// Updates the editable terms of a coupon. `used_count` is never touched here.
    pub async fn update(&self, coupon: &Coupon) -> DbResult<()> {
        info!(code = %coupon.code, "Updating coupon");

        let result = sqlx::query(
            r#"
            UPDATE coupons SET
                code = ?1, discount_type = ?2, value = ?3, min_purchase_cents = ?4,
                max_discount_cents = ?5, usage_limit = ?6, valid_from = ?7,
                valid_until = ?8, is_active = ?9, updated_at = ?10
            WHERE id = ?11
            "#,
        )
        .bind(&coupon.code)
        .bind(coupon.discount_type)
        .bind(coupon.value)
        .bind(coupon.min_purchase_cents)
        .bind(coupon.max_discount_cents)
        .bind(coupon.usage_limit)
        .bind(coupon.valid_from)
        .bind(coupon.valid_until)
        .bind(coupon.is_active)
        .bind(Utc::now())
        .bind(&coupon.id)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &coupon.code),
            other => other,
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Coupon", &coupon.id));
        }

        Ok(())
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        info!(id = %id, "Deleting coupon");

        let result = sqlx::query("DELETE FROM coupons WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Coupon", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
