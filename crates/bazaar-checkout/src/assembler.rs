//! # Order Assembler
//!
//! Builds an order from a cart (storefront checkout) or from an explicit
//! POS request, and persists it in a single transaction.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PRICING SNAPSHOT (pool reads, no locks held)                           │
//! │    lines ─► products + variations ─► unit prices ─► subtotal           │
//! │    address ─► tax rate          settings ─► shipping                    │
//! │    coupon code ─► evaluate (skip silently if it does not apply)         │
//! │                                                                         │
//! │  ORDER TRANSACTION                                                      │
//! │    coupons.redeem        guarded used_count + 1 (lost race → no disc.) │
//! │    [POS] walk-in user    INSERT OR IGNORE                               │
//! │    [POS] status          from payments vs final total                   │
//! │    orders.insert_order   header                                         │
//! │    orders.insert_line    frozen unit price + variation snapshot         │
//! │    [POS] insert_payment                                                 │
//! │    stock::reserve        conditional decrement per line                 │
//! │    [cart] carts.clear_in                                                │
//! │  COMMIT  (any error before this drops the tx → full rollback)           │
//! │                                                                         │
//! │  AFTER COMMIT: cache invalidation, audit event                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The first statement of every order transaction is a write. SQLite then
//! takes the write lock up front, and concurrent orders queue on the busy
//! timeout instead of failing a read-to-write lock upgrade.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, Transaction};
use tracing::{debug, info, warn};
use ts_rs::TS;

use bazaar_core::coupon::evaluate;
use bazaar_core::payment::{derive_pos_status, reconcile};
use bazaar_core::pricing::{self, OrderTotals};
use bazaar_core::validation::{
    validate_coupon_code, validate_line_count, validate_payment_amount, validate_payment_method,
    validate_quantity, validate_shipping_address,
};
use bazaar_core::{
    Address, Coupon, Money, Order, OrderDetails, OrderLine, OrderStatus, Payment, PaymentSummary,
    Product, ProductVariation, StockPool, VariationSelection,
};
use bazaar_db::{stock_ledger, Database, Reservation};

use crate::audit::{AuditEvent, AuditSink};
use crate::cache::{invalidate_after_order, CacheInvalidator};
use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, CheckoutResult};
use crate::tax::TaxRateService;

const WALK_IN_ADDRESS: &str = "Walk-in Customer";
const NOT_APPLICABLE: &str = "N/A";

// =============================================================================
// Requests and Views
// =============================================================================

/// One line of a POS order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PosLineItem {
    pub product_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub variations: VariationSelection,
}

/// A payment tendered with a POS order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PosPaymentInput {
    pub method: String,
    pub amount_cents: i64,
    #[serde(default)]
    pub reference: Option<String>,
}

/// Optional POS address. Missing parts fall back to walk-in placeholders,
/// except `region`, which is left empty rather than `N/A`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PosAddress {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl PosAddress {
    fn resolve(&self) -> Address {
        Address {
            address: or_placeholder(&self.address, WALK_IN_ADDRESS),
            city: or_placeholder(&self.city, NOT_APPLICABLE),
            region: or_placeholder(&self.region, ""),
            postal_code: or_placeholder(&self.postal_code, NOT_APPLICABLE),
            country: or_placeholder(&self.country, NOT_APPLICABLE),
        }
    }
}

fn or_placeholder(value: &Option<String>, placeholder: &str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(placeholder)
        .to_string()
}

/// A POS sale as submitted by the till.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PosOrderRequest {
    /// Registered customer; absent for walk-in sales.
    #[serde(default)]
    pub customer_id: Option<String>,
    pub items: Vec<PosLineItem>,
    #[serde(default)]
    pub payments: Vec<PosPaymentInput>,
    #[serde(default)]
    pub address: Option<PosAddress>,
    #[serde(default)]
    pub coupon_code: Option<String>,
    /// "online" (default) or "showroom".
    #[serde(default)]
    pub stock_pool: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A POS order with its reconciliation summary.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct PosOrderView {
    pub order: OrderDetails,
    pub payment_summary: PaymentSummary,
}

impl PosOrderView {
    pub fn from_details(order: OrderDetails) -> Self {
        let payment_summary = reconcile(order.order.total(), order.payments.iter().map(Payment::amount));
        PosOrderView {
            order,
            payment_summary,
        }
    }
}

/// A line priced against the current catalog.
#[derive(Debug, Clone)]
struct PricedLine {
    product_id: String,
    quantity: i64,
    unit_price: Money,
    variations: VariationSelection,
}

// =============================================================================
// Order Assembler
// =============================================================================

/// Order creation engine. Collaborators are injected at construction.
///
/// ## Example
/// ```rust,ignore
/// let assembler = OrderAssembler::new(
///     db.clone(),
///     Arc::new(NoopCache),
///     Arc::new(TracingAuditSink),
///     CheckoutConfig::load()?,
/// );
/// let order = assembler.checkout(&user_id, &address, Some("SAVE10")).await?;
/// ```
#[derive(Clone)]
pub struct OrderAssembler {
    pub(crate) db: Database,
    taxes: TaxRateService,
    cache: Arc<dyn CacheInvalidator>,
    audit: Arc<dyn AuditSink>,
    config: CheckoutConfig,
}

impl OrderAssembler {
    pub fn new(
        db: Database,
        cache: Arc<dyn CacheInvalidator>,
        audit: Arc<dyn AuditSink>,
        config: CheckoutConfig,
    ) -> Self {
        OrderAssembler {
            taxes: TaxRateService::new(db.clone()),
            db,
            cache,
            audit,
            config,
        }
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Cart checkout
    // -------------------------------------------------------------------------

    /// Turns the user's cart into a `pending` order and empties the cart.
    ///
    /// `total = subtotal - discount + tax + shipping`.
    pub async fn checkout(
        &self,
        user_id: &str,
        address: &Address,
        coupon_code: Option<&str>,
    ) -> CheckoutResult<OrderDetails> {
        let address = validate_shipping_address(address)?;
        self.require_user(user_id).await?;

        let cart = self.db.carts().list(user_id).await?;
        if cart.is_empty() {
            return Err(CheckoutError::validation("Cart is empty"));
        }

        let priced = self
            .price_lines(cart.iter().map(|l| (l.product_id.as_str(), l.quantity, &l.variations)).collect::<Vec<_>>())
            .await?;
        let subtotal = pricing::subtotal(priced.iter().map(|l| (l.unit_price, l.quantity)));
        let tax_rate = self
            .taxes
            .resolve(&address.country, &address.region, &address.city)
            .await;
        let shipping = self.shipping_cost().await?;
        let quoted = self.quote_coupon(coupon_code, subtotal).await?;
        let discount = quoted.as_ref().map(|(_, d)| *d).unwrap_or_default();
        let totals = OrderTotals::for_cart(subtotal, discount, tax_rate, shipping);

        debug!(
            user_id = %user_id,
            lines = priced.len(),
            subtotal = %totals.subtotal,
            tax_rate_bps = tax_rate.bps(),
            "Cart priced"
        );

        let now = Utc::now();
        let order_id = uuid::Uuid::new_v4().to_string();
        let lines = order_lines(&order_id, &priced, now);

        let mut tx = self.db.begin().await?;

        let (totals, applied_code) = self.redeem_coupon(&mut tx, quoted, totals).await?;

        let order = Order {
            id: order_id,
            user_id: user_id.to_string(),
            subtotal_cents: totals.subtotal.cents(),
            tax_cents: totals.tax.cents(),
            discount_cents: totals.discount.cents(),
            shipping_cents: totals.shipping.cents(),
            total_cents: totals.total.cents(),
            tax_rate_bps: totals.tax_rate.bps(),
            status: OrderStatus::Pending,
            address: address.address,
            city: address.city,
            region: address.region,
            postal_code: address.postal_code,
            country: address.country,
            is_pos: false,
            stock_pool: StockPool::Online,
            coupon_code: applied_code,
            notes: None,
            created_at: now,
            updated_at: now,
        };

        self.db.orders().insert_order(&mut tx, &order).await?;
        self.write_lines(&mut tx, &lines, StockPool::Online).await?;
        self.db.carts().clear_in(&mut tx, user_id).await?;

        tx.commit().await.map_err(bazaar_db::DbError::from)?;

        info!(
            order_id = %order.id,
            user_id = %user_id,
            total = %totals.total,
            coupon = order.coupon_code.as_deref().unwrap_or("-"),
            "Order created from cart"
        );

        let details = OrderDetails {
            order,
            lines,
            payments: Vec::new(),
        };
        self.after_commit(
            &details,
            AuditEvent::OrderCreated {
                order_id: details.order.id.clone(),
                user_id: details.order.user_id.clone(),
                total: details.order.total(),
                coupon_code: details.order.coupon_code.clone(),
            },
        );

        Ok(details)
    }

    // -------------------------------------------------------------------------
    // POS
    // -------------------------------------------------------------------------

    /// Records an in-store sale. No tax and no shipping.
    ///
    /// Status comes from the tendered payments: `completed` when they cover
    /// the total, `partial` when some was paid, `pending` when none was.
    /// Tendering more than the total is rejected.
    pub async fn create_pos_order(&self, request: PosOrderRequest) -> CheckoutResult<PosOrderView> {
        validate_line_count(request.items.len())?;

        let mut payments = Vec::with_capacity(request.payments.len());
        for payment in &request.payments {
            let method = validate_payment_method(&payment.method)?;
            validate_payment_amount(payment.amount_cents)?;
            let reference = payment
                .reference
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string);
            payments.push((method, Money::from_cents(payment.amount_cents), reference));
        }

        let pool = StockPool::from_tag(request.stock_pool.as_deref());
        let address = request.address.clone().unwrap_or_default().resolve();
        let notes = request
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        let customer_id = request
            .customer_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        if let Some(id) = &customer_id {
            self.require_user(id).await?;
        }

        let priced = self
            .price_lines(
                request
                    .items
                    .iter()
                    .map(|i| (i.product_id.as_str(), i.quantity, &i.variations))
                    .collect::<Vec<_>>(),
            )
            .await?;
        let subtotal = pricing::subtotal(priced.iter().map(|l| (l.unit_price, l.quantity)));
        let quoted = self.quote_coupon(request.coupon_code.as_deref(), subtotal).await?;
        let discount = quoted.as_ref().map(|(_, d)| *d).unwrap_or_default();
        let totals = OrderTotals::for_pos(subtotal, discount);

        let summary = reconcile(totals.total, payments.iter().map(|(_, amount, _)| *amount));
        // Fail fast before touching the store; re-checked below against the final total.
        derive_pos_status(totals.total, &summary)?;

        let now = Utc::now();
        let order_id = uuid::Uuid::new_v4().to_string();
        let lines = order_lines(&order_id, &priced, now);
        let payments: Vec<Payment> = payments
            .into_iter()
            .map(|(method, amount, reference)| Payment {
                id: uuid::Uuid::new_v4().to_string(),
                order_id: order_id.clone(),
                method,
                amount_cents: amount.cents(),
                reference,
                created_at: now,
            })
            .collect();

        let mut tx = self.db.begin().await?;

        let (totals, applied_code) = self.redeem_coupon(&mut tx, quoted, totals).await?;

        let user_id = match customer_id {
            Some(id) => id,
            None => {
                self.db
                    .users()
                    .find_or_create_in(&mut tx, &self.config.walk_in_email, &self.config.walk_in_name)
                    .await?
                    .id
            }
        };

        let status = derive_pos_status(totals.total, &summary)?;

        let order = Order {
            id: order_id,
            user_id,
            subtotal_cents: totals.subtotal.cents(),
            tax_cents: 0,
            discount_cents: totals.discount.cents(),
            shipping_cents: 0,
            total_cents: totals.total.cents(),
            tax_rate_bps: 0,
            status,
            address: address.address,
            city: address.city,
            region: address.region,
            postal_code: address.postal_code,
            country: address.country,
            is_pos: true,
            stock_pool: pool,
            coupon_code: applied_code,
            notes,
            created_at: now,
            updated_at: now,
        };

        let orders = self.db.orders();
        orders.insert_order(&mut tx, &order).await?;
        for line in &lines {
            orders.insert_line(&mut tx, line).await?;
        }
        for payment in &payments {
            orders.insert_payment(&mut tx, payment).await?;
        }
        self.reserve_lines(&mut tx, &lines, pool).await?;

        tx.commit().await.map_err(bazaar_db::DbError::from)?;

        info!(
            order_id = %order.id,
            user_id = %order.user_id,
            total = %totals.total,
            paid = %summary.total_paid,
            status = %status,
            pool = %pool,
            "POS order created"
        );

        let view = PosOrderView::from_details(OrderDetails {
            order,
            lines,
            payments,
        });
        self.after_commit(
            &view.order,
            AuditEvent::PosOrderCreated {
                order_id: view.order.order.id.clone(),
                user_id: view.order.order.user_id.clone(),
                total: view.order.order.total(),
                total_paid: view.payment_summary.total_paid,
                status,
            },
        );

        Ok(view)
    }

    // -------------------------------------------------------------------------
    // Pricing snapshot
    // -------------------------------------------------------------------------

    /// Prices each line from the current catalog.
    async fn price_lines<'a, I>(&self, items: I) -> CheckoutResult<Vec<PricedLine>>
    where
        I: IntoIterator<Item = (&'a str, i64, &'a VariationSelection)>,
    {
        let products = self.db.products();
        let mut catalog: HashMap<String, (Product, Vec<ProductVariation>)> = HashMap::new();
        let mut priced = Vec::new();

        for (product_id, quantity, selection) in items {
            validate_quantity(quantity)?;

            let (product, variations) = match catalog.entry(product_id.to_string()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let product = products.require_active(product_id).await?;
                    let variations = products.variations(product_id).await?;
                    entry.insert((product, variations))
                }
            };

            priced.push(PricedLine {
                product_id: product.id.clone(),
                quantity,
                unit_price: pricing::unit_price(product.price(), variations, selection),
                variations: selection.clone(),
            });
        }

        Ok(priced)
    }

    async fn shipping_cost(&self) -> CheckoutResult<Money> {
        let cents = self
            .db
            .settings()
            .shipping_cost_cents()
            .await?
            .unwrap_or(self.config.default_shipping_cents);
        Ok(Money::from_cents(cents))
    }

    /// Looks up and evaluates a coupon. Anything that does not apply is skipped.
    async fn quote_coupon(&self, code: Option<&str>, subtotal: Money) -> CheckoutResult<Option<(Coupon, Money)>> {
        let Some(code) = code.and_then(|c| validate_coupon_code(c).ok()) else {
            return Ok(None);
        };

        let coupon = self.db.coupons().get_by_code(&code).await?;
        match evaluate(coupon.as_ref(), Some(subtotal), Utc::now()) {
            Ok(discount) => Ok(coupon.map(|c| (c, discount))),
            Err(reason) => {
                debug!(code = %code, reason = %reason, "Coupon skipped");
                Ok(None)
            }
        }
    }

    async fn require_user(&self, user_id: &str) -> CheckoutResult<()> {
        if self.db.users().exists(user_id).await? {
            Ok(())
        } else {
            Err(CheckoutError::not_found("User", user_id))
        }
    }

    // -------------------------------------------------------------------------
    // Inside the transaction
    // -------------------------------------------------------------------------

    /// Consumes one coupon use. If the cap was reached since pricing, the
    /// order proceeds without the discount.
    async fn redeem_coupon(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        quoted: Option<(Coupon, Money)>,
        totals: OrderTotals,
    ) -> CheckoutResult<(OrderTotals, Option<String>)> {
        let Some((coupon, _)) = quoted else {
            return Ok((totals, None));
        };

        if self.db.coupons().redeem(tx, &coupon.id).await? {
            Ok((totals, Some(coupon.code)))
        } else {
            warn!(code = %coupon.code, "Coupon exhausted during checkout, order placed without discount");
            Ok((totals.without_discount(), None))
        }
    }

    async fn write_lines(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        lines: &[OrderLine],
        pool: StockPool,
    ) -> CheckoutResult<()> {
        let orders = self.db.orders();
        for line in lines {
            orders.insert_line(tx, line).await?;
        }
        self.reserve_lines(tx, lines, pool).await
    }

    async fn reserve_lines(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        lines: &[OrderLine],
        pool: StockPool,
    ) -> CheckoutResult<()> {
        for line in lines {
            match stock_ledger::reserve(tx, &line.product_id, pool, line.quantity).await? {
                Reservation::Reserved => {}
                Reservation::Insufficient { available } => {
                    debug!(product_id = %line.product_id, available, requested = line.quantity, "Stock short, rolling back");
                    return Err(CheckoutError::InsufficientStock {
                        product_id: line.product_id.clone(),
                        pool,
                        available,
                        requested: line.quantity,
                    });
                }
                Reservation::Missing => {
                    return Err(CheckoutError::not_found("Product", &line.product_id));
                }
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // After commit
    // -------------------------------------------------------------------------

    fn after_commit(&self, details: &OrderDetails, event: AuditEvent) {
        invalidate_after_order(
            self.cache.as_ref(),
            details.lines.iter().map(|l| l.product_id.as_str()),
        );
        self.audit.record(event);
    }
}

fn order_lines(order_id: &str, priced: &[PricedLine], now: DateTime<Utc>) -> Vec<OrderLine> {
    priced
        .iter()
        .map(|line| OrderLine {
            id: uuid::Uuid::new_v4().to_string(),
            order_id: order_id.to_string(),
            product_id: line.product_id.clone(),
            quantity: line.quantity,
            unit_price_cents: line.unit_price.cents(),
            variations: line.variations.clone(),
            created_at: now,
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditSink;
    use crate::cache::RecordingCache;
    use bazaar_core::{DiscountType, TaxRateRule, User};
    use bazaar_db::DbConfig;
    use chrono::Duration;

    struct Fixture {
        db: Database,
        cache: Arc<RecordingCache>,
        audit: Arc<MemoryAuditSink>,
        assembler: OrderAssembler,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cache = Arc::new(RecordingCache::new());
        let audit = Arc::new(MemoryAuditSink::new());
        let assembler = OrderAssembler::new(
            db.clone(),
            cache.clone(),
            audit.clone(),
            CheckoutConfig::default().default_shipping_cents(1_000),
        );
        Fixture {
            db,
            cache,
            audit,
            assembler,
        }
    }

    async fn product(db: &Database, sku: &str, price_cents: i64, stock: i64, pos_stock: i64) -> Product {
        let now = Utc::now();
        let product = Product {
            id: uuid::Uuid::new_v4().to_string(),
            sku: sku.to_string(),
            name: sku.to_string(),
            price_cents,
            stock,
            pos_stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
        product
    }

    async fn customer(db: &Database) -> User {
        db.users().create("ana@example.com", "Ana").await.unwrap()
    }

    async fn coupon(db: &Database, code: &str, discount_type: DiscountType, value: i64, usage_limit: i64) -> Coupon {
        let now = Utc::now();
        let coupon = Coupon {
            id: uuid::Uuid::new_v4().to_string(),
            code: code.to_string(),
            discount_type,
            value,
            min_purchase_cents: 0,
            max_discount_cents: 0,
            usage_limit,
            used_count: 0,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(1),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.coupons().insert(&coupon).await.unwrap();
        coupon
    }

    async fn tax_rule(db: &Database, country: &str, region: &str, rate_bps: u32, is_default: bool) {
        let now = Utc::now();
        db.tax_rates()
            .create(&TaxRateRule {
                id: uuid::Uuid::new_v4().to_string(),
                country: country.to_string(),
                region: region.to_string(),
                city: String::new(),
                rate_bps,
                is_default,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
    }

    fn dhaka() -> Address {
        Address {
            address: "House 1, Road 2".to_string(),
            city: "Dhaka".to_string(),
            region: "Dhaka".to_string(),
            postal_code: "1207".to_string(),
            country: "BD".to_string(),
        }
    }

    fn selection(pairs: &[(&str, &str)]) -> VariationSelection {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn pos_request(items: Vec<PosLineItem>, payments: &[i64]) -> PosOrderRequest {
        PosOrderRequest {
            items,
            payments: payments
                .iter()
                .map(|amount| PosPaymentInput {
                    method: "cash".to_string(),
                    amount_cents: *amount,
                    reference: None,
                })
                .collect(),
            ..Default::default()
        }
    }

    fn item(product_id: &str, quantity: i64) -> PosLineItem {
        PosLineItem {
            product_id: product_id.to_string(),
            quantity,
            variations: VariationSelection::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Cart checkout
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_checkout_totals_and_cart_cleared() {
        let f = fixture().await;
        let user = customer(&f.db).await;
        let tee = product(&f.db, "TEE", 10_000, 5, 0).await;
        f.db.products()
            .add_variation(&tee.id, "Size", &[("XL", 500)])
            .await
            .unwrap();
        tax_rule(&f.db, "BD", "", 1_500, true).await;
        tax_rule(&f.db, "BD", "Dhaka", 750, false).await;
        coupon(&f.db, "SAVE10", DiscountType::Percentage, 1_000, 0).await;

        f.db.carts()
            .add(&user.id, &tee.id, 2, &selection(&[("Size", "XL")]))
            .await
            .unwrap();

        let details = f.assembler.checkout(&user.id, &dhaka(), Some("SAVE10")).await.unwrap();
        let order = &details.order;

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.subtotal_cents, 21_000);
        assert_eq!(order.discount_cents, 2_100);
        assert_eq!(order.tax_rate_bps, 750);
        assert_eq!(order.tax_cents, 1_575);
        assert_eq!(order.shipping_cents, 1_000);
        assert_eq!(
            order.total_cents,
            order.subtotal_cents - order.discount_cents + order.tax_cents + order.shipping_cents
        );
        assert_eq!(order.coupon_code.as_deref(), Some("SAVE10"));
        assert_eq!(details.lines[0].unit_price_cents, 10_500);
        assert_eq!(details.lines[0].variations, selection(&[("Size", "XL")]));

        assert!(f.db.carts().list(&user.id).await.unwrap().is_empty());
        assert_eq!(f.db.products().get_by_id(&tee.id).await.unwrap().unwrap().stock, 3);
        assert_eq!(f.db.coupons().get_by_code("SAVE10").await.unwrap().unwrap().used_count, 1);
    }

    #[tokio::test]
    async fn test_checkout_shipping_setting_overrides_config() {
        let f = fixture().await;
        let user = customer(&f.db).await;
        let mug = product(&f.db, "MUG", 800, 5, 0).await;
        f.db.settings().set(bazaar_core::SHIPPING_COST_SETTING, "250").await.unwrap();
        f.db.carts().add(&user.id, &mug.id, 1, &VariationSelection::new()).await.unwrap();

        let details = f.assembler.checkout(&user.id, &dhaka(), None).await.unwrap();
        assert_eq!(details.order.shipping_cents, 250);
        assert_eq!(details.order.total_cents, 1_050);
    }

    #[tokio::test]
    async fn test_checkout_price_is_frozen() {
        let f = fixture().await;
        let user = customer(&f.db).await;
        let mug = product(&f.db, "MUG", 800, 5, 0).await;
        f.db.carts().add(&user.id, &mug.id, 1, &VariationSelection::new()).await.unwrap();

        let details = f.assembler.checkout(&user.id, &dhaka(), None).await.unwrap();
        sqlx::query("UPDATE products SET price_cents = 9999 WHERE id = ?1")
            .bind(&mug.id)
            .execute(f.db.pool())
            .await
            .unwrap();

        let lines = f.db.orders().lines(&details.order.id).await.unwrap();
        assert_eq!(lines[0].unit_price_cents, 800);
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_rejected() {
        let f = fixture().await;
        let user = customer(&f.db).await;

        assert!(matches!(
            f.assembler.checkout(&user.id, &dhaka(), None).await,
            Err(CheckoutError::Validation(msg)) if msg == "Cart is empty"
        ));
    }

    #[tokio::test]
    async fn test_checkout_missing_address_field_rejected() {
        let f = fixture().await;
        let user = customer(&f.db).await;
        let mut address = dhaka();
        address.postal_code = "  ".to_string();

        assert!(matches!(
            f.assembler.checkout(&user.id, &address, None).await,
            Err(CheckoutError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_checkout_insufficient_stock_rolls_back_everything() {
        let f = fixture().await;
        let user = customer(&f.db).await;
        let plenty = product(&f.db, "PLENTY", 500, 10, 0).await;
        let scarce = product(&f.db, "SCARCE", 500, 1, 0).await;
        coupon(&f.db, "ONCE", DiscountType::Fixed, 100, 1).await;
        f.db.carts().add(&user.id, &plenty.id, 2, &VariationSelection::new()).await.unwrap();
        f.db.carts().add(&user.id, &scarce.id, 3, &VariationSelection::new()).await.unwrap();

        let err = f.assembler.checkout(&user.id, &dhaka(), Some("ONCE")).await.unwrap_err();
        match err {
            CheckoutError::InsufficientStock {
                product_id,
                available,
                requested,
                ..
            } => {
                assert_eq!(product_id, scarce.id);
                assert_eq!(available, 1);
                assert_eq!(requested, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert_eq!(f.db.products().get_by_id(&plenty.id).await.unwrap().unwrap().stock, 10);
        assert_eq!(f.db.carts().list(&user.id).await.unwrap().len(), 2);
        assert_eq!(f.db.coupons().get_by_code("ONCE").await.unwrap().unwrap().used_count, 0);
        assert!(f.db.orders().list_for_user(&user.id, 10, 0).await.unwrap().is_empty());
        assert!(f.audit.events().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_ignores_invalid_coupon() {
        let f = fixture().await;
        let user = customer(&f.db).await;
        let mug = product(&f.db, "MUG", 800, 5, 0).await;
        f.db.carts().add(&user.id, &mug.id, 1, &VariationSelection::new()).await.unwrap();

        let details = f.assembler.checkout(&user.id, &dhaka(), Some("NOPE")).await.unwrap();
        assert_eq!(details.order.discount_cents, 0);
        assert!(details.order.coupon_code.is_none());
    }

    #[tokio::test]
    async fn test_checkout_fixed_coupon_never_makes_total_negative() {
        let f = fixture().await;
        let user = customer(&f.db).await;
        let pin = product(&f.db, "PIN", 300, 5, 0).await;
        coupon(&f.db, "BIG", DiscountType::Fixed, 5_000, 0).await;
        f.db.carts().add(&user.id, &pin.id, 1, &VariationSelection::new()).await.unwrap();

        let details = f.assembler.checkout(&user.id, &dhaka(), Some("BIG")).await.unwrap();
        assert_eq!(details.order.discount_cents, 300 + 1_000);
        assert_eq!(details.order.total_cents, 0);
    }

    #[tokio::test]
    async fn test_checkout_unknown_user() {
        let f = fixture().await;
        assert!(matches!(
            f.assembler.checkout("ghost", &dhaka(), None).await,
            Err(CheckoutError::NotFound { entity, .. }) if entity == "User"
        ));
    }

    #[tokio::test]
    async fn test_checkout_notifies_cache_and_audit() {
        let f = fixture().await;
        let user = customer(&f.db).await;
        let mug = product(&f.db, "MUG", 800, 5, 0).await;
        f.db.carts().add(&user.id, &mug.id, 1, &VariationSelection::new()).await.unwrap();

        let details = f.assembler.checkout(&user.id, &dhaka(), None).await.unwrap();

        let keys = f.cache.keys();
        assert!(keys.contains(&format!("product:{}", mug.id)));
        assert!(keys.contains(&"products:list:*".to_string()));
        assert!(keys.contains(&"dashboard:stats".to_string()));

        let events = f.audit.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].order_id(), details.order.id);
    }

    // -------------------------------------------------------------------------
    // POS
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_pos_overpayment_rejected() {
        let f = fixture().await;
        let shirt = product(&f.db, "SHIRT", 500, 5, 5).await;

        let err = f
            .assembler
            .create_pos_order(pos_request(vec![item(&shirt.id, 1)], &[300, 300]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Overpayment { total, paid }
                if total == Money::from_cents(500) && paid == Money::from_cents(600)
        ));
        assert_eq!(f.db.products().get_by_id(&shirt.id).await.unwrap().unwrap().stock, 5);
    }

    #[tokio::test]
    async fn test_pos_tender_overflow_rejected() {
        let f = fixture().await;
        let shirt = product(&f.db, "SHIRT", 500, 5, 5).await;

        let err = f
            .assembler
            .create_pos_order(pos_request(vec![item(&shirt.id, 1)], &[i64::MAX, 2]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CheckoutError::Overpayment { total, paid }
                if total == Money::from_cents(500) && paid == Money::from_cents(i64::MAX)
        ));
        assert_eq!(f.db.products().get_by_id(&shirt.id).await.unwrap().unwrap().stock, 5);
        assert!(f.assembler.list_pos_orders(&Default::default()).await.unwrap().orders.is_empty());
    }

    #[tokio::test]
    async fn test_pos_partial_payment() {
        let f = fixture().await;
        let shirt = product(&f.db, "SHIRT", 500, 5, 5).await;

        let view = f
            .assembler
            .create_pos_order(pos_request(vec![item(&shirt.id, 1)], &[200]))
            .await
            .unwrap();

        assert_eq!(view.order.order.status, OrderStatus::Partial);
        assert_eq!(view.payment_summary.total_paid, Money::from_cents(200));
        assert_eq!(view.payment_summary.remaining_balance, Money::from_cents(300));
        assert!(!view.payment_summary.is_fully_paid);
        assert_eq!(view.order.payments.len(), 1);
    }

    #[tokio::test]
    async fn test_pos_statuses_from_payments() {
        let f = fixture().await;
        let shirt = product(&f.db, "SHIRT", 500, 10, 10).await;

        let paid = f
            .assembler
            .create_pos_order(pos_request(vec![item(&shirt.id, 1)], &[300, 200]))
            .await
            .unwrap();
        assert_eq!(paid.order.order.status, OrderStatus::Completed);
        assert!(paid.payment_summary.is_fully_paid);

        let unpaid = f
            .assembler
            .create_pos_order(pos_request(vec![item(&shirt.id, 1)], &[]))
            .await
            .unwrap();
        assert_eq!(unpaid.order.order.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_pos_has_no_tax_or_shipping_and_uses_walk_in() {
        let f = fixture().await;
        let shirt = product(&f.db, "SHIRT", 500, 5, 5).await;
        tax_rule(&f.db, "BD", "", 1_500, true).await;

        let view = f
            .assembler
            .create_pos_order(pos_request(vec![item(&shirt.id, 2)], &[1_000]))
            .await
            .unwrap();
        let order = &view.order.order;

        assert_eq!(order.tax_cents, 0);
        assert_eq!(order.shipping_cents, 0);
        assert_eq!(order.total_cents, 1_000);
        assert!(order.is_pos);
        assert_eq!(order.address, "Walk-in Customer");
        assert_eq!(order.city, "N/A");
        assert_eq!(order.country, "N/A");

        let walk_in = f.db.users().get(&order.user_id).await.unwrap().unwrap();
        assert_eq!(walk_in.email, crate::config::DEFAULT_WALK_IN_EMAIL);

        let second = f
            .assembler
            .create_pos_order(pos_request(vec![item(&shirt.id, 1)], &[]))
            .await
            .unwrap();
        assert_eq!(second.order.order.user_id, order.user_id);
    }

    #[tokio::test]
    async fn test_pos_stock_pool_selection() {
        let f = fixture().await;
        let shirt = product(&f.db, "SHIRT", 500, 5, 5).await;

        let default_pool = f
            .assembler
            .create_pos_order(pos_request(vec![item(&shirt.id, 1)], &[]))
            .await
            .unwrap();
        assert_eq!(default_pool.order.order.stock_pool, StockPool::Online);

        let mut request = pos_request(vec![item(&shirt.id, 2)], &[]);
        request.stock_pool = Some("showroom".to_string());
        f.assembler.create_pos_order(request).await.unwrap();

        let loaded = f.db.products().get_by_id(&shirt.id).await.unwrap().unwrap();
        assert_eq!(loaded.stock, 4);
        assert_eq!(loaded.pos_stock, 3);
    }

    #[tokio::test]
    async fn test_pos_insufficient_showroom_stock() {
        let f = fixture().await;
        let shirt = product(&f.db, "SHIRT", 500, 50, 1).await;

        let mut request = pos_request(vec![item(&shirt.id, 2)], &[1_000]);
        request.stock_pool = Some("showroom".to_string());

        let err = f.assembler.create_pos_order(request).await.unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::InsufficientStock { pool: StockPool::Showroom, available: 1, requested: 2, .. }
        ));
        let (orders, total) = f.db.orders().list_pos(&Default::default()).await.unwrap();
        assert!(orders.is_empty());
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_pos_coupon_discounts_total() {
        let f = fixture().await;
        let shirt = product(&f.db, "SHIRT", 10_000, 5, 5).await;
        let mut capped = coupon(&f.db, "CAP80", DiscountType::Percentage, 1_000, 0).await;
        capped.max_discount_cents = 800;
        f.db.coupons().update(&capped).await.unwrap();

        let mut request = pos_request(vec![item(&shirt.id, 1)], &[9_200]);
        request.coupon_code = Some("CAP80".to_string());
        let view = f.assembler.create_pos_order(request).await.unwrap();

        assert_eq!(view.order.order.discount_cents, 800);
        assert_eq!(view.order.order.total_cents, 9_200);
        assert_eq!(view.order.order.status, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn test_pos_validation() {
        let f = fixture().await;
        let shirt = product(&f.db, "SHIRT", 500, 5, 5).await;

        assert!(matches!(
            f.assembler.create_pos_order(pos_request(vec![], &[])).await,
            Err(CheckoutError::Validation(_))
        ));
        assert!(matches!(
            f.assembler.create_pos_order(pos_request(vec![item(&shirt.id, 0)], &[])).await,
            Err(CheckoutError::Validation(_))
        ));
        assert!(matches!(
            f.assembler.create_pos_order(pos_request(vec![item(&shirt.id, 1)], &[-5])).await,
            Err(CheckoutError::Validation(_))
        ));
        assert!(matches!(
            f.assembler.create_pos_order(pos_request(vec![item("ghost", 1)], &[])).await,
            Err(CheckoutError::NotFound { .. })
        ));

        let mut unknown_customer = pos_request(vec![item(&shirt.id, 1)], &[]);
        unknown_customer.customer_id = Some("ghost".to_string());
        assert!(matches!(
            f.assembler.create_pos_order(unknown_customer).await,
            Err(CheckoutError::NotFound { entity, .. }) if entity == "User"
        ));
    }

    #[test]
    fn test_pos_address_defaults() {
        let partial = PosAddress {
            city: Some("Chattogram".to_string()),
            country: Some("  ".to_string()),
            ..Default::default()
        };
        let address = partial.resolve();
        assert_eq!(address.address, "Walk-in Customer");
        assert_eq!(address.city, "Chattogram");
        assert_eq!(address.postal_code, "N/A");
        assert_eq!(address.country, "N/A");
        assert_eq!(address.region, "");
    }
}
