//! Read side of the order engine: POS order lookup and listing, and a
//! customer's own order history.

use serde::Serialize;
use ts_rs::TS;

use bazaar_core::{Order, OrderDetails};
use bazaar_db::PosOrderFilter;

use crate::assembler::{OrderAssembler, PosOrderView};
use crate::error::{CheckoutError, CheckoutResult};

/// One page of POS orders, newest first.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct PosOrderPage {
    pub orders: Vec<Order>,
    /// Matching orders across all pages.
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

impl OrderAssembler {
    /// A POS order with its lines, payments and payment summary.
    ///
    /// Storefront orders are reported as not found.
    pub async fn get_pos_order(&self, order_id: &str) -> CheckoutResult<PosOrderView> {
        let order = self
            .db
            .orders()
            .get(order_id)
            .await?
            .filter(|o| o.is_pos)
            .ok_or_else(|| CheckoutError::not_found("Order", order_id))?;

        let details = self.db.orders().details(order).await?;
        Ok(PosOrderView::from_details(details))
    }

    pub async fn list_pos_orders(&self, filter: &PosOrderFilter) -> CheckoutResult<PosOrderPage> {
        let filter = filter.normalized();
        let (orders, total) = self.db.orders().list_pos(&filter).await?;

        Ok(PosOrderPage {
            orders,
            total,
            page: filter.page,
            limit: filter.limit,
        })
    }

    /// A customer's orders, newest first. `page` starts at 1.
    pub async fn list_orders_for_user(&self, user_id: &str, page: u32, limit: u32) -> CheckoutResult<Vec<Order>> {
        let limit = limit.clamp(1, PosOrderFilter::MAX_LIMIT);
        let offset = page.max(1).saturating_sub(1).saturating_mul(limit);
        Ok(self.db.orders().list_for_user(user_id, limit, offset).await?)
    }

    /// One of the customer's orders. Orders of other users are not found.
    pub async fn get_order_for_user(&self, user_id: &str, order_id: &str) -> CheckoutResult<OrderDetails> {
        let order = self
            .db
            .orders()
            .get_for_user(user_id, order_id)
            .await?
            .ok_or_else(|| CheckoutError::not_found("Order", order_id))?;

        Ok(self.db.orders().details(order).await?)
    }
}
