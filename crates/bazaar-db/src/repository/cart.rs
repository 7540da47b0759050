//! # Cart Repository
//!
//! A cart line is identified by `(user, product, variation selection)`.
//! Adding the same triple again merges the quantities into one line.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{decode_variations, encode_variations, new_id};
use bazaar_core::{CartLine, VariationSelection};

const CART_COLUMNS: &str = "id, user_id, product_id, quantity, variations, created_at, updated_at";

/// Cart line as stored (variations as JSON text).
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: String,
    user_id: String,
    product_id: String,
    quantity: i64,
    variations: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = DbError;

    fn try_from(row: CartLineRow) -> DbResult<Self> {
        Ok(CartLine {
            variations: decode_variations(&row.variations)?,
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_lines(rows: Vec<CartLineRow>) -> DbResult<Vec<CartLine>> {
    rows.into_iter().map(CartLine::try_from).collect()
}

/// Repository for cart lines.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Lists a user's cart lines, oldest first.
    pub async fn list(&self, user_id: &str) -> DbResult<Vec<CartLine>> {
        let sql = format!(
            "SELECT {} FROM cart_items WHERE user_id = ?1 ORDER BY created_at, id",
            CART_COLUMNS
        );
        let rows = sqlx::query_as::<_, CartLineRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        into_lines(rows)
    }

    /// Gets one line, scoped to its owner.
    pub async fn get(&self, user_id: &str, line_id: &str) -> DbResult<Option<CartLine>> {
        let sql = format!(
            "SELECT {} FROM cart_items WHERE id = ?1 AND user_id = ?2",
            CART_COLUMNS
        );
        let row = sqlx::query_as::<_, CartLineRow>(&sql)
            .bind(line_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(CartLine::try_from).transpose()
    }

    /// Finds the line holding this exact product and selection.
    pub async fn find_line(
        &self,
        user_id: &str,
        product_id: &str,
        variations: &VariationSelection,
    ) -> DbResult<Option<CartLine>> {
        let sql = format!(
            "SELECT {} FROM cart_items WHERE user_id = ?1 AND product_id = ?2 AND variations = ?3",
            CART_COLUMNS
        );
        let row = sqlx::query_as::<_, CartLineRow>(&sql)
            .bind(user_id)
            .bind(product_id)
            .bind(encode_variations(variations)?)
            .fetch_optional(&self.pool)
            .await?;

        row.map(CartLine::try_from).transpose()
    }

    /// Adds `quantity` units, merging into an existing identical line.
    pub async fn add(
        &self,
        user_id: &str,
        product_id: &str,
        quantity: i64,
        variations: &VariationSelection,
    ) -> DbResult<CartLine> {
        debug!(user_id = %user_id, product_id = %product_id, quantity, "Adding to cart");

        let encoded = encode_variations(variations)?;
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO cart_items (id, user_id, product_id, quantity, variations, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            ON CONFLICT (user_id, product_id, variations)
            DO UPDATE SET quantity = quantity + excluded.quantity, updated_at = excluded.updated_at
            "#,
        )
        .bind(new_id())
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .bind(&encoded)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_line(user_id, product_id, variations)
            .await?
            .ok_or_else(|| DbError::not_found("CartLine", product_id))
    }

    /// Sets the quantity of a line owned by `user_id`.
    pub async fn update_quantity(&self, user_id: &str, line_id: &str, quantity: i64) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE cart_items SET quantity = ?1, updated_at = ?2 WHERE id = ?3 AND user_id = ?4",
        )
        .bind(quantity)
        .bind(Utc::now())
        .bind(line_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CartLine", line_id));
        }

        Ok(())
    }

    /// Removes a line owned by `user_id`.
    pub async fn remove(&self, user_id: &str, line_id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = ?1 AND user_id = ?2")
            .bind(line_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CartLine", line_id));
        }

        Ok(())
    }

    /// Empties a user's cart inside the order transaction.
    pub async fn clear_in(&self, tx: &mut Transaction<'_, Sqlite>, user_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = ?1")
            .bind(user_id)
            .execute(&mut **tx)
            .await?;

        debug!(user_id = %user_id, removed = result.rows_affected(), "Cart cleared");
        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
