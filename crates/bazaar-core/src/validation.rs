//! # Validation Module
//!
//! Input validation for the order entry points and the admin surfaces.
//!
//! ```text
//! HTTP JSON ──► serde (types) ──► THIS MODULE (rules) ──► SQLite constraints
//! ```
//!
//! Validators trim their input and return the cleaned value where that is
//! useful to the caller.

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::types::{Address, DiscountType};
use crate::{MAX_ITEM_QUANTITY, MAX_ORDER_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn required_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates a shipping address for cart checkout.
///
/// ## Rules
/// - address, city, postal_code and country are required
/// - region is optional (it only narrows tax resolution)
pub fn validate_shipping_address(address: &Address) -> ValidationResult<Address> {
    Ok(Address {
        address: required_text("address", &address.address, 500)?,
        city: required_text("city", &address.city, 100)?,
        region: address.region.trim().to_string(),
        postal_code: required_text("postal_code", &address.postal_code, 20)?,
        country: required_text("country", &address.country, 100)?,
    })
}

/// Validates and normalizes a coupon code (trimmed, 1-64 chars).
pub fn validate_coupon_code(code: &str) -> ValidationResult<String> {
    required_text("coupon_code", code, 64)
}

/// Validates a payment method tag (cash, card, mobile, ...).
pub fn validate_payment_method(method: &str) -> ValidationResult<String> {
    required_text("method", method, 50)
}

/// Validates a UUID string.
pub fn validate_uuid(field: &str, value: &str) -> ValidationResult<()> {
    uuid::Uuid::parse_str(value.trim()).map_err(|e| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity (1..=999).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates the number of lines in a POS order.
pub fn validate_line_count(count: usize) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::required("items"));
    }

    if count > MAX_ORDER_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_LINES as i64,
        });
    }

    Ok(())
}

/// A payment amount must be strictly positive.
pub fn validate_payment_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }
    Ok(())
}

/// Prices and stock levels cannot be negative.
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a tax rate (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "rate_bps".to_string(),
            min: 0,
            max: 10_000,
        });
    }
    Ok(())
}

// =============================================================================
// Coupon Definition
// =============================================================================

/// Validates the numeric shape of a coupon definition.
pub fn validate_coupon_terms(
    discount_type: DiscountType,
    value: i64,
    min_purchase_cents: i64,
    max_discount_cents: i64,
    usage_limit: i64,
    valid_from: DateTime<Utc>,
    valid_until: DateTime<Utc>,
) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "value".to_string(),
        });
    }

    if discount_type == DiscountType::Percentage && value > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "value".to_string(),
            min: 1,
            max: 10_000,
        });
    }

    validate_non_negative("min_purchase_cents", min_purchase_cents)?;
    validate_non_negative("max_discount_cents", max_discount_cents)?;
    validate_non_negative("usage_limit", usage_limit)?;

    if valid_from > valid_until {
        return Err(ValidationError::InvalidFormat {
            field: "valid_until".to_string(),
            reason: "must not be before valid_from".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
