//! # Repository Module
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Pool methods (&self)                Transaction methods (tx)           │
//! │  ────────────────────                ────────────────────────           │
//! │  products().get_by_id()              coupons().redeem(tx, id)           │
//! │  carts().list()                      orders().insert_order(tx, ..)      │
//! │  tax_rates().candidates()            stock::reserve(tx, ..)             │
//! │  settings().shipping_cost_cents()    carts().clear_in(tx, user)         │
//! │                                      users().find_or_create_in(tx, ..)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Products and variations
//! - [`stock`] - Atomic per-pool stock reservation
//! - [`cart::CartRepository`] - Cart lines
//! - [`order::OrderRepository`] - Orders, lines and payments
//! - [`coupon::CouponRepository`] - Coupons and guarded redemption
//! - [`tax_rate::TaxRateRepository`] - Tax rules with single-default handling
//! - [`user::UserRepository`] - Customers and the walk-in user
//! - [`setting::SettingRepository`] - Key/value settings

use bazaar_core::VariationSelection;

use crate::error::DbResult;

pub mod cart;
pub mod coupon;
pub mod order;
pub mod product;
pub mod setting;
pub mod stock;
pub mod tax_rate;
pub mod user;

/// Encodes a variation selection for a TEXT column (key-sorted JSON).
pub(crate) fn encode_variations(variations: &VariationSelection) -> DbResult<String> {
    Ok(serde_json::to_string(variations)?)
}

/// Decodes a stored variation selection. Empty text decodes as no selection.
pub(crate) fn decode_variations(raw: &str) -> DbResult<VariationSelection> {
    if raw.trim().is_empty() {
        return Ok(VariationSelection::new());
    }
    Ok(serde_json::from_str(raw)?)
}

/// Generates a new entity ID.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variation_encoding_is_stable() {
        let mut selection = VariationSelection::new();
        selection.insert("Size".to_string(), "M".to_string());
        selection.insert("Color".to_string(), "Red".to_string());

        let raw = encode_variations(&selection).unwrap();
        assert_eq!(raw, r#"{"Color":"Red","Size":"M"}"#);
        assert_eq!(decode_variations(&raw).unwrap(), selection);
    }

    #[test]
    fn test_empty_variations_decode() {
        assert!(decode_variations("").unwrap().is_empty());
        assert!(decode_variations("{}").unwrap().is_empty());
        assert!(decode_variations("not json").is_err());
    }
}
