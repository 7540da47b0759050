//! # Checkout Error Types
//!
//! ```text
//! ValidationError ─┐
//! CoreError ───────┼──► CheckoutError ──► ApiError (storefront-api)
//! DbError ─────────┘
//! ```
//!
//! | variant             | meaning                                    | retry? |
//! |---------------------|--------------------------------------------|--------|
//! | `Validation`        | malformed or missing input, empty cart     | no     |
//! | `NotFound`          | product, customer, order or coupon missing | no     |
//! | `InsufficientStock` | a pool cannot cover a line                 | yes    |
//! | `Overpayment`       | POS tender exceeds the total               | no     |
//! | `CouponRejected`    | standalone coupon validation only          | no     |
//! | `Conflict`          | duplicate coupon code and similar          | no     |
//! | `Persistence`       | store failure, everything rolled back      | maybe  |

use thiserror::Error;

use bazaar_core::{CoreError, CouponRejection, Money, StockPool, ValidationError};
use bazaar_db::DbError;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Insufficient {pool} stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        pool: StockPool,
        available: i64,
        requested: i64,
    },

    #[error("Total payments {paid} exceed order total {total}")]
    Overpayment { total: Money, paid: Money },

    #[error("{0}")]
    CouponRejected(CouponRejection),

    #[error("{0}")]
    Conflict(String),

    #[error("Persistence error: {0}")]
    Persistence(DbError),
}

impl CheckoutError {
    pub fn validation(message: impl Into<String>) -> Self {
        CheckoutError::Validation(message.into())
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CheckoutError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Whether the caller may reasonably retry the same request.
    pub fn is_retryable(&self) -> bool {
        match self {
            CheckoutError::InsufficientStock { .. } => true,
            CheckoutError::Persistence(e) => e.is_busy() || matches!(e, DbError::PoolExhausted),
            _ => false,
        }
    }
}

impl From<ValidationError> for CheckoutError {
    fn from(err: ValidationError) -> Self {
        CheckoutError::Validation(err.to_string())
    }
}

impl From<CoreError> for CheckoutError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InsufficientStock {
                product_id,
                pool,
                available,
                requested,
            } => CheckoutError::InsufficientStock {
                product_id,
                pool,
                available,
                requested,
            },
            CoreError::Overpayment { total, paid } => CheckoutError::Overpayment { total, paid },
            CoreError::Validation(e) => e.into(),
            other => CheckoutError::Validation(other.to_string()),
        }
    }
}

impl From<DbError> for CheckoutError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => CheckoutError::NotFound { entity, id },
            DbError::UniqueViolation { field, value } => {
                CheckoutError::Conflict(format!("{} '{}' already exists", field, value))
            }
            other => CheckoutError::Persistence(other),
        }
    }
}

impl From<CouponRejection> for CheckoutError {
    fn from(rejection: CouponRejection) -> Self {
        CheckoutError::CouponRejected(rejection)
    }
}

/// Result type for checkout operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;
