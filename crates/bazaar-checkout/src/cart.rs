//! # Cart Service
//!
//! Storefront cart maintenance. Identical (product, variations) lines merge;
//! every resulting quantity stays within 1..=999 and within online stock at
//! the time of the change. Stock is checked again when the cart is ordered.

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use bazaar_core::validation::validate_quantity;
use bazaar_core::{CartLine, StockPool, VariationSelection};
use bazaar_db::Database;

use crate::error::{CheckoutError, CheckoutResult};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AddCartItem {
    pub product_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub variations: VariationSelection,
}

#[derive(Debug, Clone)]
pub struct CartService {
    db: Database,
}

impl CartService {
    pub fn new(db: Database) -> Self {
        CartService { db }
    }

    pub async fn list(&self, user_id: &str) -> CheckoutResult<Vec<CartLine>> {
        self.require_user(user_id).await?;
        Ok(self.db.carts().list(user_id).await?)
    }

    /// Adds an item, merging into an identical existing line.
    pub async fn add_item(&self, user_id: &str, item: AddCartItem) -> CheckoutResult<CartLine> {
        validate_quantity(item.quantity)?;
        self.require_user(user_id).await?;

        let existing = self
            .db
            .carts()
            .find_line(user_id, &item.product_id, &item.variations)
            .await?
            .map(|line| line.quantity)
            .unwrap_or(0);
        let merged = existing + item.quantity;
        validate_quantity(merged)?;
        self.require_stock(&item.product_id, merged).await?;

        let line = self
            .db
            .carts()
            .add(user_id, &item.product_id, item.quantity, &item.variations)
            .await?;
        debug!(user_id = %user_id, line_id = %line.id, quantity = line.quantity, "Cart line saved");
        Ok(line)
    }

    pub async fn update_item(&self, user_id: &str, line_id: &str, quantity: i64) -> CheckoutResult<CartLine> {
        validate_quantity(quantity)?;

        let carts = self.db.carts();
        let line = carts
            .get(user_id, line_id)
            .await?
            .ok_or_else(|| CheckoutError::not_found("CartLine", line_id))?;
        self.require_stock(&line.product_id, quantity).await?;

        carts.update_quantity(user_id, line_id, quantity).await?;
        Ok(CartLine { quantity, ..line })
    }

    pub async fn remove_item(&self, user_id: &str, line_id: &str) -> CheckoutResult<()> {
        Ok(self.db.carts().remove(user_id, line_id).await?)
    }

    async fn require_user(&self, user_id: &str) -> CheckoutResult<()> {
        if self.db.users().exists(user_id).await? {
            Ok(())
        } else {
            Err(CheckoutError::not_found("User", user_id))
        }
    }

    async fn require_stock(&self, product_id: &str, quantity: i64) -> CheckoutResult<()> {
        let product = self.db.products().require_active(product_id).await?;
        let available = product.stock_in(StockPool::Online);
        if quantity > available {
            return Err(CheckoutError::InsufficientStock {
                product_id: product.id,
                pool: StockPool::Online,
                available,
                requested: quantity,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::{Product, User};
    use bazaar_db::DbConfig;
    use chrono::Utc;

    async fn setup(stock: i64) -> (CartService, User, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = db.users().create("lee@example.com", "Lee").await.unwrap();
        let now = Utc::now();
        let product = Product {
            id: uuid::Uuid::new_v4().to_string(),
            sku: "SOCK".to_string(),
            name: "Sock".to_string(),
            price_cents: 300,
            stock,
            pos_stock: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
        (CartService::new(db), user, product)
    }

    fn add(product_id: &str, quantity: i64, size: &str) -> AddCartItem {
        AddCartItem {
            product_id: product_id.to_string(),
            quantity,
            variations: [("Size".to_string(), size.to_string())].into_iter().collect(),
        }
    }

    #[tokio::test]
    async fn test_identical_lines_merge() {
        let (carts, user, sock) = setup(10).await;

        carts.add_item(&user.id, add(&sock.id, 2, "M")).await.unwrap();
        let merged = carts.add_item(&user.id, add(&sock.id, 3, "M")).await.unwrap();
        carts.add_item(&user.id, add(&sock.id, 1, "L")).await.unwrap();

        assert_eq!(merged.quantity, 5);
        assert_eq!(carts.list(&user.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_stock_limits_merged_quantity() {
        let (carts, user, sock) = setup(4).await;

        carts.add_item(&user.id, add(&sock.id, 3, "M")).await.unwrap();
        assert!(matches!(
            carts.add_item(&user.id, add(&sock.id, 2, "M")).await,
            Err(CheckoutError::InsufficientStock { available: 4, requested: 5, .. })
        ));
    }

    #[tokio::test]
    async fn test_update_and_remove() {
        let (carts, user, sock) = setup(10).await;
        let line = carts.add_item(&user.id, add(&sock.id, 1, "M")).await.unwrap();

        let updated = carts.update_item(&user.id, &line.id, 7).await.unwrap();
        assert_eq!(updated.quantity, 7);
        assert!(matches!(
            carts.update_item(&user.id, &line.id, 0).await,
            Err(CheckoutError::Validation(_))
        ));
        assert!(matches!(
            carts.update_item(&user.id, &line.id, 11).await,
            Err(CheckoutError::InsufficientStock { .. })
        ));

        carts.remove_item(&user.id, &line.id).await.unwrap();
        assert!(carts.list(&user.id).await.unwrap().is_empty());
        assert!(matches!(
            carts.remove_item(&user.id, &line.id).await,
            Err(CheckoutError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_user_and_product() {
        let (carts, user, _sock) = setup(10).await;

        assert!(matches!(
            carts.add_item("ghost", add("whatever", 1, "M")).await,
            Err(CheckoutError::NotFound { entity, .. }) if entity == "User"
        ));
        assert!(matches!(
            carts.add_item(&user.id, add("missing", 1, "M")).await,
            Err(CheckoutError::NotFound { .. })
        ));
    }
}
