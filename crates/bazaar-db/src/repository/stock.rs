//! # Stock Ledger
//!
//! Order-time consumption of the two per-product stock pools.
//!
//! ## Check-and-Decrement in One Statement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UPDATE products SET stock = stock - 3 WHERE id = ? AND stock >= 3      │
//! │                                                                         │
//! │  rows_affected = 1  → reserved                                         │
//! │  rows_affected = 0  → SELECT stock ... → Insufficient { available }    │
//! │                       (or Missing when the product row is gone)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two concurrent orders can never both pass the guard for the last unit:
//! SQLite serializes the writes and the second one re-evaluates
//! `stock >= q` against the committed value. Stock can never go negative
//! (the schema also carries a CHECK constraint).

use chrono::Utc;
use sqlx::{Sqlite, Transaction};
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::StockPool;

/// Outcome of a reservation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    Reserved,
    Insufficient { available: i64 },
    Missing,
}

/// Atomically decrements `pool` of `product_id` by `quantity` if it can.
pub async fn reserve(
    tx: &mut Transaction<'_, Sqlite>,
    product_id: &str,
    pool: StockPool,
    quantity: i64,
) -> DbResult<Reservation> {
    debug!(product_id = %product_id, pool = %pool, quantity, "Reserving stock");

    let sql = match pool {
        StockPool::Online => {
            "UPDATE products SET stock = stock - ?1, updated_at = ?2 WHERE id = ?3 AND stock >= ?1"
        }
        StockPool::Showroom => {
            "UPDATE products SET pos_stock = pos_stock - ?1, updated_at = ?2 WHERE id = ?3 AND pos_stock >= ?1"
        }
    };

    let result = sqlx::query(sql)
        .bind(quantity)
        .bind(Utc::now())
        .bind(product_id)
        .execute(&mut **tx)
        .await?;

    if result.rows_affected() == 1 {
        return Ok(Reservation::Reserved);
    }

    match available_in(tx, product_id, pool).await? {
        Some(available) => Ok(Reservation::Insufficient { available }),
        None => Ok(Reservation::Missing),
    }
}

/// Current level of one pool, read inside the transaction.
pub async fn available_in(
    tx: &mut Transaction<'_, Sqlite>,
    product_id: &str,
    pool: StockPool,
) -> DbResult<Option<i64>> {
    let sql = match pool {
        StockPool::Online => "SELECT stock FROM products WHERE id = ?1",
        StockPool::Showroom => "SELECT pos_stock FROM products WHERE id = ?1",
    };

    let available: Option<i64> = sqlx::query_scalar(sql)
        .bind(product_id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(available)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{memory_db, seed_product};

    #[tokio::test]
    async fn test_reserve_decrements_only_selected_pool() {
        let db = memory_db().await;
        let product = seed_product(&db, "MUG-01", 800, 5, 5).await;

        let mut tx = db.begin().await.unwrap();
        let outcome = reserve(&mut tx, &product.id, StockPool::Showroom, 3).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(outcome, Reservation::Reserved);
        let loaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(loaded.pos_stock, 2);
        assert_eq!(loaded.stock, 5);
    }

    #[tokio::test]
    async fn test_reserve_reports_available_when_short() {
        let db = memory_db().await;
        let product = seed_product(&db, "MUG-01", 800, 2, 0).await;

        let mut tx = db.begin().await.unwrap();
        let outcome = reserve(&mut tx, &product.id, StockPool::Online, 3).await.unwrap();
        drop(tx);

        assert_eq!(outcome, Reservation::Insufficient { available: 2 });
        let loaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(loaded.stock, 2);
    }

    #[tokio::test]
    async fn test_reserve_exact_remaining_stock() {
        let db = memory_db().await;
        let product = seed_product(&db, "MUG-01", 800, 3, 0).await;

        let mut tx = db.begin().await.unwrap();
        assert_eq!(
            reserve(&mut tx, &product.id, StockPool::Online, 3).await.unwrap(),
            Reservation::Reserved
        );
        assert_eq!(
            reserve(&mut tx, &product.id, StockPool::Online, 1).await.unwrap(),
            Reservation::Insufficient { available: 0 }
        );
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_reserve_missing_product() {
        let db = memory_db().await;

        let mut tx = db.begin().await.unwrap();
        let outcome = reserve(&mut tx, "nope", StockPool::Online, 1).await.unwrap();
        assert_eq!(outcome, Reservation::Missing);
    }

    #[tokio::test]
    async fn test_rollback_restores_stock() {
        let db = memory_db().await;
        let product = seed_product(&db, "MUG-01", 800, 5, 0).await;

        {
            let mut tx = db.begin().await.unwrap();
            reserve(&mut tx, &product.id, StockPool::Online, 4).await.unwrap();
            tx.rollback().await.unwrap();
        }

        let loaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(loaded.stock, 5);
    }
}
