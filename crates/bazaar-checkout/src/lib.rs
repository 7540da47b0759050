//! # bazaar-checkout: Order Creation for Bazaar
//!
//! Turns a shopper's cart, or a cashier's POS sale, into a persisted order.
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
//! │  │            ★ bazaar-checkout (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   OrderAssembler    CartService    CouponService    TaxRate-   │   │
//! │  │   checkout / POS                                    Service    │   │
//! │  │        │                                                        │   │
//! │  │        ├──► CacheInvalidator (after commit)                     │   │
//! │  │        └──► AuditSink        (after commit)                     │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼──────────────┐  ┌────────────▼────────────────────┐  │
//! │  │   bazaar-core (pure rules)  │  │   bazaar-db (SQLite, sqlx)      │  │
//! │  └─────────────────────────────┘  └─────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! An order is created completely or not at all. Stock counters never go
//! negative, a coupon is never redeemed past its usage limit, and a POS
//! order never records more payment than its total.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bazaar_checkout::{CheckoutConfig, NoopCache, OrderAssembler, TracingAuditSink};
//!
//! let assembler = OrderAssembler::new(
//!     db,
//!     Arc::new(NoopCache),
//!     Arc::new(TracingAuditSink),
//!     CheckoutConfig::load()?,
//! );
//! let order = assembler.checkout(&user_id, &address, None).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod assembler;
pub mod audit;
pub mod cache;
pub mod cart;
pub mod config;
pub mod coupons;
pub mod error;
pub mod queries;
pub mod tax;

// =============================================================================
// Re-exports
// =============================================================================

pub use assembler::{
    OrderAssembler, PosAddress, PosLineItem, PosOrderRequest, PosOrderView, PosPaymentInput,
};
pub use audit::{AuditEvent, AuditSink, TracingAuditSink};
pub use cache::{CacheInvalidator, NoopCache};
pub use cart::{AddCartItem, CartService};
pub use config::{CheckoutConfig, ConfigError};
pub use coupons::{CouponInput, CouponQuote, CouponService};
pub use error::{CheckoutError, CheckoutResult};
pub use queries::PosOrderPage;
pub use tax::{TaxQuote, TaxRateInput, TaxRateService};

#[cfg(any(test, feature = "test-util"))]
pub use audit::MemoryAuditSink;
#[cfg(any(test, feature = "test-util"))]
pub use cache::RecordingCache;
