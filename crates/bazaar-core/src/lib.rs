//! # bazaar-core: Pure Checkout Logic for Bazaar
//!
//! Every rule that decides what an order costs lives here as a pure
//! function. The database crate persists what these functions compute; the
//! checkout crate wires the two together inside one transaction.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               storefront-api (axum HTTP)                        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               bazaar-checkout (Order Assembler)                 │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────────┐  ┌────────▼────────────────────┐  │
//! │  │   ★ bazaar-core (THIS CRATE) ★  │  │   bazaar-db (SQLite)        │  │
//! │  │                                 │  │   repositories, ledger      │  │
//! │  │  tax     coupon    payment      │  └─────────────────────────────┘  │
//! │  │  pricing money     validation   │                                   │
//! │  │                                 │                                   │
//! │  │  NO I/O • NO DATABASE • NO CLOCK│                                   │
//! │  └─────────────────────────────────┘                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Order, Coupon, TaxRateRule, StockPool, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`tax`] - Specificity-ordered tax rate resolution
//! - [`coupon`] - Coupon eligibility and discount computation
//! - [`payment`] - Split-tender reconciliation and POS status derivation
//! - [`pricing`] - Unit prices, subtotals and order totals
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use bazaar_core::money::Money;
//! use bazaar_core::payment::reconcile;
//!
//! let total = Money::from_cents(50_000);
//! let summary = reconcile(total, [Money::from_cents(20_000)]);
//!
//! assert_eq!(summary.remaining_balance, Money::from_cents(30_000));
//! assert!(!summary.is_fully_paid);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod coupon;
pub mod error;
pub mod money;
pub mod payment;
pub mod pricing;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use coupon::CouponRejection;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use payment::PaymentSummary;
pub use pricing::OrderTotals;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single line.
///
/// Guards against typos such as 1000 instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum number of lines in one POS order.
pub const MAX_ORDER_LINES: usize = 100;

/// Settings key holding the flat shipping cost in cents.
pub const SHIPPING_COST_SETTING: &str = "shipping_cost";
