//! # Order Pricing
//!
//! Unit prices and order totals for both entry points.
//!
//! ## Totals
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart checkout                       POS                                │
//! │  ─────────────                       ───                                │
//! │  subtotal  = Σ unit × qty            subtotal  = Σ unit × qty           │
//! │  discount  = coupon (≤ gross)        discount  = coupon (≤ subtotal)    │
//! │  tax       = subtotal × rate          tax       = 0                     │
//! │  shipping  = configured cost          shipping  = 0                     │
//! │  total     = sub - disc + tax + ship  total     = sub - disc            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tax is charged on the pre-discount subtotal. A fixed discount may exceed
//! the subtotal and eat into tax and shipping. It is only reduced where it
//! would push the total below zero (gross is `subtotal + tax + shipping`),
//! and that effective amount is what the order records, so the stored
//! columns always satisfy `total == subtotal - discount + tax + shipping`.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{ProductVariation, TaxRate, VariationSelection};

// =============================================================================
// Unit Price
// =============================================================================

/// Resolves the current unit price of a product for a variation selection.
///
/// Each selected option that matches a known option of the product adds its
/// price modifier. Variation names match case-insensitively, option values
/// exactly. Unknown selections (custom values) have no price effect; they
/// are still kept in the line's snapshot by the caller.
pub fn unit_price(
    base: Money,
    variations: &[ProductVariation],
    selection: &VariationSelection,
) -> Money {
    selection
        .iter()
        .filter_map(|(name, value)| {
            variations
                .iter()
                .find(|v| v.name.eq_ignore_ascii_case(name))
                .and_then(|v| v.options.iter().find(|o| &o.value == value))
        })
        .fold(base, |price, option| {
            price + Money::from_cents(option.price_modifier_cents)
        })
}

/// Σ unit price × quantity.
pub fn subtotal<I>(lines: I) -> Money
where
    I: IntoIterator<Item = (Money, i64)>,
{
    lines
        .into_iter()
        .map(|(unit, qty)| unit.multiply_quantity(qty))
        .sum()
}

// =============================================================================
// Totals
// =============================================================================

/// Computed money columns of an order header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub shipping: Money,
    pub total: Money,
    pub tax_rate: TaxRate,
}

impl OrderTotals {
    /// Totals for a cart checkout: taxed and shipped.
    pub fn for_cart(subtotal: Money, discount: Money, tax_rate: TaxRate, shipping: Money) -> Self {
        let tax = subtotal.calculate_tax(tax_rate);
        let shipping = shipping.non_negative();
        let discount = effective_discount(subtotal + tax + shipping, discount);

        OrderTotals {
            subtotal,
            discount,
            tax,
            shipping,
            total: subtotal - discount + tax + shipping,
            tax_rate,
        }
    }

    /// Totals for a POS order: no tax, no shipping.
    pub fn for_pos(subtotal: Money, discount: Money) -> Self {
        let discount = effective_discount(subtotal, discount);

        OrderTotals {
            subtotal,
            discount,
            tax: Money::zero(),
            shipping: Money::zero(),
            total: subtotal - discount,
            tax_rate: TaxRate::zero(),
        }
    }

    /// Same totals with the discount removed.
    ///
    /// Used when the coupon is lost to a concurrent redemption between
    /// pricing and the guarded usage increment.
    pub fn without_discount(&self) -> Self {
        OrderTotals {
            discount: Money::zero(),
            total: self.subtotal + self.tax + self.shipping,
            ..*self
        }
    }
}

/// Caps the discount at the pre-discount total.
#[inline]
fn effective_discount(gross: Money, discount: Money) -> Money {
    discount.non_negative().min(gross.non_negative())
}

// =============================================================================
// Unit Tests
// =============================================================================
