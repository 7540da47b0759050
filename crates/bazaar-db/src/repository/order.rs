//! # Order Repository
//!
//! Orders are written once, inside the order transaction, together with
//! their lines and payments. Reads run on the pool.
//!
//! ## Write Order Inside the Transaction
//! ```text
//! insert_order(tx, header)
//!   └─► insert_line(tx, line)        × N   (frozen price + selection)
//!   └─► insert_payment(tx, payment)  × M   (POS only)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{decode_variations, encode_variations};
use bazaar_core::{Order, OrderDetails, OrderLine, OrderStatus, Payment};

const ORDER_COLUMNS: &str = r#"
    id, user_id, subtotal_cents, tax_cents, discount_cents, shipping_cents,
    total_cents, tax_rate_bps, status, address, city, region, postal_code,
    country, is_pos, stock_pool, coupon_code, notes, created_at, updated_at
"#;

/// Order line as stored (variations as JSON text).
#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    id: String,
    order_id: String,
    product_id: String,
    quantity: i64,
    unit_price_cents: i64,
    variations: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderLineRow> for OrderLine {
    type Error = DbError;

    fn try_from(row: OrderLineRow) -> DbResult<Self> {
        Ok(OrderLine {
            variations: decode_variations(&row.variations)?,
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            quantity: row.quantity,
            unit_price_cents: row.unit_price_cents,
            created_at: row.created_at,
        })
    }
}

/// Filter for the POS order listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosOrderFilter {
    pub status: Option<OrderStatus>,
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
}

impl PosOrderFilter {
    pub const MAX_LIMIT: u32 = 100;

    /// Clamps page to >= 1 and limit to 1..=100.
    pub fn normalized(&self) -> Self {
        PosOrderFilter {
            status: self.status,
            page: self.page.max(1),
            limit: self.limit.clamp(1, Self::MAX_LIMIT),
        }
    }

    fn offset(&self) -> u32 {
        (self.page.max(1) - 1).saturating_mul(self.limit)
    }
}

impl Default for PosOrderFilter {
    fn default() -> Self {
        PosOrderFilter {
            status: None,
            page: 1,
            limit: 20,
        }
    }
}

/// Repository for orders, order lines and payments.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Transactional writes
    // -------------------------------------------------------------------------

    /// Inserts an order header.
    pub async fn insert_order(&self, tx: &mut Transaction<'_, Sqlite>, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, total = order.total_cents, is_pos = order.is_pos, "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, subtotal_cents, tax_cents, discount_cents, shipping_cents,
                total_cents, tax_rate_bps, status, address, city, region, postal_code,
                country, is_pos, stock_pool, coupon_code, notes, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
            "#,
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(order.subtotal_cents)
        .bind(order.tax_cents)
        .bind(order.discount_cents)
        .bind(order.shipping_cents)
        .bind(order.total_cents)
        .bind(order.tax_rate_bps)
        .bind(order.status)
        .bind(&order.address)
        .bind(&order.city)
        .bind(&order.region)
        .bind(&order.postal_code)
        .bind(&order.country)
        .bind(order.is_pos)
        .bind(order.stock_pool)
        .bind(&order.coupon_code)
        .bind(&order.notes)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Inserts an order line with its frozen price and selection.
    pub async fn insert_line(&self, tx: &mut Transaction<'_, Sqlite>, line: &OrderLine) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO order_items (
                id, order_id, product_id, quantity, unit_price_cents, variations, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&line.id)
        .bind(&line.order_id)
        .bind(&line.product_id)
        .bind(line.quantity)
        .bind(line.unit_price_cents)
        .bind(encode_variations(&line.variations)?)
        .bind(line.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Inserts a payment record.
    pub async fn insert_payment(&self, tx: &mut Transaction<'_, Sqlite>, payment: &Payment) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO payments (id, order_id, method, amount_cents, reference, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.order_id)
        .bind(&payment.method)
        .bind(payment.amount_cents)
        .bind(&payment.reference)
        .bind(payment.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    pub async fn get(&self, id: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLUMNS);
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    /// Gets an order only if it belongs to `user_id`.
    pub async fn get_for_user(&self, user_id: &str, id: &str) -> DbResult<Option<Order>> {
        let sql = format!(
            "SELECT {} FROM orders WHERE id = ?1 AND user_id = ?2",
            ORDER_COLUMNS
        );
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    pub async fn lines(&self, order_id: &str) -> DbResult<Vec<OrderLine>> {
        let rows = sqlx::query_as::<_, OrderLineRow>(
            r#"
            SELECT id, order_id, product_id, quantity, unit_price_cents, variations, created_at
            FROM order_items WHERE order_id = ?1 ORDER BY created_at, id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(OrderLine::try_from).collect()
    }

    pub async fn payments(&self, order_id: &str) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, order_id, method, amount_cents, reference, created_at
            FROM payments WHERE order_id = ?1 ORDER BY created_at, id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Loads header, lines and payments of an order.
    pub async fn details(&self, order: Order) -> DbResult<OrderDetails> {
        let lines = self.lines(&order.id).await?;
        let payments = self.payments(&order.id).await?;

        Ok(OrderDetails {
            order,
            lines,
            payments,
        })
    }

    /// Lists a customer's orders, newest first.
    pub async fn list_for_user(&self, user_id: &str, limit: u32, offset: u32) -> DbResult<Vec<Order>> {
        let sql = format!(
            "SELECT {} FROM orders WHERE user_id = ?1 ORDER BY created_at DESC, id LIMIT ?2 OFFSET ?3",
            ORDER_COLUMNS
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    /// Lists POS orders, newest first. Returns the page and the total match count.
    pub async fn list_pos(&self, filter: &PosOrderFilter) -> DbResult<(Vec<Order>, i64)> {
        let filter = filter.normalized();
        let status = filter.status.map(|s| s.as_str());

        let sql = format!(
            r#"
            SELECT {} FROM orders
            WHERE is_pos = 1 AND (?1 IS NULL OR status = ?1)
            ORDER BY created_at DESC, id
            LIMIT ?2 OFFSET ?3
            "#,
            ORDER_COLUMNS
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(status)
            .bind(filter.limit)
            .bind(filter.offset())
            .fetch_all(&self.pool)
            .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE is_pos = 1 AND (?1 IS NULL OR status = ?1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok((orders, total))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::new_id;
    use crate::repository::test_support::{memory_db, seed_product, seed_user};
    use bazaar_core::{StockPool, VariationSelection};
    use chrono::Duration;

    fn order(user_id: &str, is_pos: bool, status: OrderStatus, created_at: DateTime<Utc>) -> Order {
        Order {
            id: new_id(),
            user_id: user_id.to_string(),
            subtotal_cents: 1_000,
            tax_cents: 0,
            discount_cents: 0,
            shipping_cents: 0,
            total_cents: 1_000,
            tax_rate_bps: 0,
            status,
            address: "1 Road".to_string(),
            city: "Dhaka".to_string(),
            region: String::new(),
            postal_code: "1207".to_string(),
            country: "BD".to_string(),
            is_pos,
            stock_pool: StockPool::Online,
            coupon_code: None,
            notes: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[tokio::test]
    async fn test_insert_and_load_details() {
        let db = memory_db().await;
        let user = seed_user(&db, "ana@example.com").await;
        let product = seed_product(&db, "TEE-001", 500, 10, 0).await;

        let header = order(&user.id, true, OrderStatus::Partial, Utc::now());
        let mut selection = VariationSelection::new();
        selection.insert("Color".to_string(), "Red".to_string());
        let line = OrderLine {
            id: new_id(),
            order_id: header.id.clone(),
            product_id: product.id.clone(),
            quantity: 2,
            unit_price_cents: 500,
            variations: selection.clone(),
            created_at: Utc::now(),
        };
        let payment = Payment {
            id: new_id(),
            order_id: header.id.clone(),
            method: "cash".to_string(),
            amount_cents: 400,
            reference: None,
            created_at: Utc::now(),
        };

        let orders = db.orders();
        let mut tx = db.begin().await.unwrap();
        orders.insert_order(&mut tx, &header).await.unwrap();
        orders.insert_line(&mut tx, &line).await.unwrap();
        orders.insert_payment(&mut tx, &payment).await.unwrap();
        tx.commit().await.unwrap();

        let loaded = db.orders().get(&header.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Partial);
        assert_eq!(loaded.stock_pool, StockPool::Online);
        assert!(loaded.is_pos);

        let details = db.orders().details(loaded).await.unwrap();
        assert_eq!(details.lines.len(), 1);
        assert_eq!(details.lines[0].variations, selection);
        assert_eq!(details.payments[0].amount_cents, 400);
    }

    #[tokio::test]
    async fn test_uncommitted_order_is_invisible() {
        let db = memory_db().await;
        let user = seed_user(&db, "ana@example.com").await;
        let header = order(&user.id, false, OrderStatus::Pending, Utc::now());

        {
            let orders = db.orders();
            let mut tx = db.begin().await.unwrap();
            orders.insert_order(&mut tx, &header).await.unwrap();
        }

        assert!(db.orders().get(&header.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_for_user_is_owner_scoped() {
        let db = memory_db().await;
        let owner = seed_user(&db, "ana@example.com").await;
        let other = seed_user(&db, "bo@example.com").await;
        let header = order(&owner.id, false, OrderStatus::Pending, Utc::now());

        let orders = db.orders();
        let mut tx = db.begin().await.unwrap();
        orders.insert_order(&mut tx, &header).await.unwrap();
        tx.commit().await.unwrap();

        assert!(db.orders().get_for_user(&owner.id, &header.id).await.unwrap().is_some());
        assert!(db.orders().get_for_user(&other.id, &header.id).await.unwrap().is_none());
        assert_eq!(db.orders().list_for_user(&owner.id, 10, 0).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_pos_filters_and_pages() {
        let db = memory_db().await;
        let user = seed_user(&db, "walkin@example.com").await;
        let base = Utc::now();

        let orders = db.orders();
        let mut tx = db.begin().await.unwrap();
        for i in 0..5 {
            let status = if i % 2 == 0 { OrderStatus::Completed } else { OrderStatus::Partial };
            let header = order(&user.id, true, status, base + Duration::seconds(i));
            orders.insert_order(&mut tx, &header).await.unwrap();
        }
        let online = order(&user.id, false, OrderStatus::Pending, base);
        orders.insert_order(&mut tx, &online).await.unwrap();
        tx.commit().await.unwrap();

        let (all, total) = db.orders().list_pos(&PosOrderFilter::default()).await.unwrap();
        assert_eq!(total, 5);
        assert!(all.iter().all(|o| o.is_pos));
        assert!(all[0].created_at >= all[1].created_at);

        let completed = PosOrderFilter {
            status: Some(OrderStatus::Completed),
            page: 1,
            limit: 2,
        };
        let (page, total) = db.orders().list_pos(&completed).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 2);

        let second = PosOrderFilter { page: 2, ..completed };
        let (page, _) = db.orders().list_pos(&second).await.unwrap();
        assert_eq!(page.len(), 1);
    }

    #[test]
    fn test_filter_normalization() {
        let filter = PosOrderFilter {
            status: None,
            page: 0,
            limit: 1_000,
        }
        .normalized();
        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, PosOrderFilter::MAX_LIMIT);
        assert_eq!(filter.offset(), 0);
    }
}
