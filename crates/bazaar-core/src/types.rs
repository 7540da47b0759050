//! # Domain Types
//!
//! Core domain types shared by the database layer, the checkout engine and
//! the HTTP API.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  price_cents    │   │  subtotal       │   │  order_id (FK)  │       │
//! │  │  stock (online) │   │  tax / discount │   │  method tag     │       │
//! │  │  pos_stock      │   │  shipping/total │   │  amount_cents   │       │
//! │  └─────────────────┘   │  status         │   └─────────────────┘       │
//! │                        └────────┬────────┘                              │
//! │                                 │ owns                                  │
//! │                        ┌────────▼────────┐                              │
//! │                        │   OrderLine     │  frozen unit price +         │
//! │                        │                 │  variation snapshot          │
//! │                        └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Coupon       │   │  TaxRateRule    │   │   StockPool     │       │
//! │  │  percentage|    │   │  country/region │   │  Online         │       │
//! │  │  fixed, cap,    │   │  /city, bps,    │   │  Showroom       │       │
//! │  │  window, usage  │   │  is_default     │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

/// A variation selection such as `{"Color": "Red", "Size": "M"}`.
///
/// A `BTreeMap` keeps the keys sorted, so the JSON form of two equal
/// selections is byte-identical (the cart relies on this to merge lines).
pub type VariationSelection = BTreeMap<String, String>;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (825 = 8.25%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (15.0 → 1500 bps).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Stock Pool
// =============================================================================

/// One of the two independent inventory counters a product carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockPool {
    /// Website inventory (`products.stock`).
    #[serde(alias = "website")]
    Online,
    /// Physical store inventory sold through the POS (`products.pos_stock`).
    Showroom,
}

impl StockPool {
    /// Parses a loosely-typed stock selector from a request.
    ///
    /// Absent, empty or unknown values select the online pool.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(|t| t.trim().to_ascii_lowercase()).as_deref() {
            Some("showroom") | Some("pos") => StockPool::Showroom,
            _ => StockPool::Online,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            StockPool::Online => "online",
            StockPool::Showroom => "showroom",
        }
    }
}

impl Default for StockPool {
    fn default() -> Self {
        StockPool::Online
    }
}

impl fmt::Display for StockPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// User
// =============================================================================

/// An order owner. POS sales without a customer use a synthetic walk-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A sellable product with its two stock pools.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub sku: String,
    pub name: String,
    /// Base price before variation modifiers.
    pub price_cents: i64,
    /// Online (website) stock.
    pub stock: i64,
    /// Showroom (POS) stock.
    pub pos_stock: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Stock currently held in the given pool.
    pub fn stock_in(&self, pool: StockPool) -> i64 {
        match pool {
            StockPool::Online => self.stock,
            StockPool::Showroom => self.pos_stock,
        }
    }
}

// =============================================================================
// Product Variations
// =============================================================================

/// A selectable option of a variation, e.g. "Red" with +$2.00.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct VariationOption {
    pub id: String,
    pub variation_id: String,
    pub value: String,
    /// Added to the product price when this option is selected.
    pub price_modifier_cents: i64,
}

/// A variation axis of a product, e.g. "Color".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductVariation {
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub options: Vec<VariationOption>,
}

// =============================================================================
// Cart
// =============================================================================

/// One line of a user's cart. Ephemeral: deleted when an order is created.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub variations: VariationSelection,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Address
// =============================================================================

/// A shipping destination. Not geo-validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Address {
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub region: String,
    pub postal_code: String,
    pub country: String,
}

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle status of an order.
///
/// ```text
/// pending ──► partial ──► completed
///    │
///    └──► processing ──► shipped ──► completed      (administrative)
///    └──► cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Partial,
    Processing,
    Shipped,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Partial => "partial",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Order
// =============================================================================

/// Order header. `total = subtotal - discount + tax + shipping` at creation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub shipping_cents: i64,
    pub total_cents: i64,
    /// Tax rate applied, in basis points.
    pub tax_rate_bps: u32,
    pub status: OrderStatus,
    pub address: String,
    pub city: String,
    pub region: String,
    pub postal_code: String,
    pub country: String,
    pub is_pos: bool,
    /// Pool the lines were reserved from.
    pub stock_pool: StockPool,
    /// Code of the coupon that was actually redeemed.
    pub coupon_code: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// A line of an order. Price and variations are frozen at creation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLine {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,
    /// Unit price in cents at time of order (frozen).
    pub unit_price_cents: i64,
    /// Variation selection at time of order (frozen).
    pub variations: VariationSelection,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderLine {
    /// unit price × quantity.
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Payment
// =============================================================================

/// A settlement fact handed in with a POS order. Several per order are allowed.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    /// Free-form tag: cash, card, mobile, ...
    pub method: String,
    pub amount_cents: i64,
    pub reference: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Payment {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// An assembled order: header, lines and (for POS orders) payments.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDetails {
    pub order: Order,
    pub lines: Vec<OrderLine>,
    pub payments: Vec<Payment>,
}

// =============================================================================
// Coupon
// =============================================================================

/// How a coupon's `value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `value` is basis points of the subtotal (1000 = 10%).
    Percentage,
    /// `value` is cents off.
    Fixed,
}

/// A discount code.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Coupon {
    pub id: String,
    pub code: String,
    pub discount_type: DiscountType,
    pub value: i64,
    pub min_purchase_cents: i64,
    /// Cap for percentage coupons; 0 means uncapped.
    pub max_discount_cents: i64,
    /// 0 means unlimited.
    pub usage_limit: i64,
    pub used_count: i64,
    #[ts(as = "String")]
    pub valid_from: DateTime<Utc>,
    #[ts(as = "String")]
    pub valid_until: DateTime<Utc>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Tax Rate Rule
// =============================================================================

/// A tax rate keyed by location. Empty region/city act as wildcards.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TaxRateRule {
    pub id: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub rate_bps: u32,
    pub is_default: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl TaxRateRule {
    #[inline]
    pub fn rate(&self) -> TaxRate {
        TaxRate::from_bps(self.rate_bps)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_percentage() {
        let rate = TaxRate::from_percentage(8.25);
        assert_eq!(rate.bps(), 825);
        assert!((rate.percentage() - 8.25).abs() < 0.001);
    }

    #[test]
    fn test_stock_pool_from_tag() {
        assert_eq!(StockPool::from_tag(None), StockPool::Online);
        assert_eq!(StockPool::from_tag(Some("")), StockPool::Online);
        assert_eq!(StockPool::from_tag(Some("website")), StockPool::Online);
        assert_eq!(StockPool::from_tag(Some("Showroom")), StockPool::Showroom);
        assert_eq!(StockPool::from_tag(Some("warehouse")), StockPool::Online);
    }

    #[test]
    fn test_stock_pool_accepts_website_alias() {
        let pool: StockPool = serde_json::from_str("\"website\"").unwrap();
        assert_eq!(pool, StockPool::Online);
        assert_eq!(serde_json::to_string(&pool).unwrap(), "\"online\"");
    }

    #[test]
    fn test_order_status_serialization() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Partial).unwrap(),
            "\"partial\""
        );
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_variation_selection_json_is_key_sorted() {
        let mut a = VariationSelection::new();
        a.insert("Size".to_string(), "M".to_string());
        a.insert("Color".to_string(), "Red".to_string());
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            r#"{"Color":"Red","Size":"M"}"#
        );
    }

    #[test]
    fn test_order_line_total() {
        let line = OrderLine {
            id: "l".to_string(),
            order_id: "o".to_string(),
            product_id: "p".to_string(),
            quantity: 3,
            unit_price_cents: 299,
            variations: VariationSelection::new(),
            created_at: Utc::now(),
        };
        assert_eq!(line.line_total().cents(), 897);
    }
}
