//! # Product Repository
//!
//! Products, their variations and administrative stock levels.
//! Order-time stock consumption goes through [`crate::repository::stock`].

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::new_id;
use bazaar_core::{Product, ProductVariation, StockPool, VariationOption};

const PRODUCT_COLUMNS: &str =
    "id, sku, name, price_cents, stock, pos_stock, is_active, created_at, updated_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID, active or not.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets an active product or fails with NotFound.
    pub async fn require_active(&self, id: &str) -> DbResult<Product> {
        match self.get_by_id(id).await? {
            Some(product) if product.is_active => Ok(product),
            _ => Err(DbError::not_found("Product", id)),
        }
    }

    /// Lists active products ordered by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {} FROM products WHERE is_active = 1 ORDER BY name LIMIT ?1",
            PRODUCT_COLUMNS
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, name, price_cents, stock, pos_stock,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.pos_stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &product.sku),
            other => other,
        })?;

        Ok(())
    }

    /// Sets the absolute stock level of one pool (restock / stock take).
    pub async fn set_stock(&self, id: &str, pool: StockPool, quantity: i64) -> DbResult<()> {
        debug!(id = %id, pool = %pool, quantity, "Setting stock");

        let sql = match pool {
            StockPool::Online => "UPDATE products SET stock = ?1, updated_at = ?2 WHERE id = ?3",
            StockPool::Showroom => "UPDATE products SET pos_stock = ?1, updated_at = ?2 WHERE id = ?3",
        };

        let result = sqlx::query(sql)
            .bind(quantity)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Adds a variation axis with its options.
    pub async fn add_variation(
        &self,
        product_id: &str,
        name: &str,
        options: &[(&str, i64)],
    ) -> DbResult<ProductVariation> {
        let mut tx = self.pool.begin().await?;
        let variation_id = new_id();

        sqlx::query("INSERT INTO product_variations (id, product_id, name) VALUES (?1, ?2, ?3)")
            .bind(&variation_id)
            .bind(product_id)
            .bind(name)
            .execute(&mut *tx)
            .await?;

        let mut stored = Vec::with_capacity(options.len());
        for (value, modifier) in options {
            let option = VariationOption {
                id: new_id(),
                variation_id: variation_id.clone(),
                value: value.to_string(),
                price_modifier_cents: *modifier,
            };

            sqlx::query(
                "INSERT INTO variation_options (id, variation_id, value, price_modifier_cents) VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(&option.id)
            .bind(&option.variation_id)
            .bind(&option.value)
            .bind(option.price_modifier_cents)
            .execute(&mut *tx)
            .await?;

            stored.push(option);
        }

        tx.commit().await?;

        Ok(ProductVariation {
            id: variation_id,
            product_id: product_id.to_string(),
            name: name.to_string(),
            options: stored,
        })
    }

    /// Loads the variations of a product with their options.
    pub async fn variations(&self, product_id: &str) -> DbResult<Vec<ProductVariation>> {
        let heads: Vec<(String, String)> = sqlx::query_as(
            "SELECT id, name FROM product_variations WHERE product_id = ?1 ORDER BY name",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        let options = sqlx::query_as::<_, VariationOption>(
            r#"
            SELECT o.id, o.variation_id, o.value, o.price_modifier_cents
            FROM variation_options o
            INNER JOIN product_variations v ON v.id = o.variation_id
            WHERE v.product_id = ?1
            ORDER BY o.value
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        let variations = heads
            .into_iter()
            .map(|(id, name)| ProductVariation {
                options: options
                    .iter()
                    .filter(|o| o.variation_id == id)
                    .cloned()
                    .collect(),
                product_id: product_id.to_string(),
                id,
                name,
            })
            .collect();

        Ok(variations)
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
