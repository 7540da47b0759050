//! # Error Types
//!
//! Domain-specific error types for bazaar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bazaar-core (this file)                                               │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bazaar-db                                                             │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  bazaar-checkout                                                       │
//! │  └── CheckoutError    - What an order attempt can fail with            │
//! │                                                                         │
//! │  storefront-api                                                        │
//! │  └── ApiError         - What HTTP clients see (serialized)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Coupon rejections are not errors during order creation (the discount is
//! simply skipped), so they live in [`crate::coupon::CouponRejection`].

use thiserror::Error;

use crate::money::Money;
use crate::types::StockPool;

// =============================================================================
// Core Error
// =============================================================================

/// Core business rule violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The order has no lines (empty cart or empty POS item list).
    #[error("Order has no items")]
    EmptyOrder,

    /// A stock pool cannot cover the requested quantity.
    ///
    /// ```text
    /// POS order: 5 × SHIRT-RED from showroom
    ///      │
    ///      ▼
    /// showroom stock = 3
    ///      │
    ///      ▼
    /// InsufficientStock { product_id, pool: Showroom, available: 3, requested: 5 }
    /// ```
    #[error("Insufficient {pool} stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        pool: StockPool,
        available: i64,
        requested: i64,
    },

    /// Tendered payments exceed the order total.
    #[error("Total payments {paid} exceed order total {total}")]
    Overpayment { total: Money, paid: Money },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. invalid UUID, inverted date range).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
