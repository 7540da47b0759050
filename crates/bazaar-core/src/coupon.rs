//! # Coupon Rules
//!
//! Eligibility and discount computation for a single coupon.
//!
//! ## Evaluation Order
//! ```text
//! code ──► found? ──► active? ──► from <= now <= until? ──► under usage cap?
//!                                                               │
//!                          discount ◄── subtotal >= minimum? ◄──┘
//! ```
//!
//! The checkout engine calls [`evaluate`] and silently drops the discount on
//! any rejection. The standalone validation endpoint reports the
//! [`CouponRejection`] to the caller instead.
//!
//! Redemption (incrementing `used_count`) is not done here: it must happen
//! as a guarded update inside the order transaction.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::money::Money;
use crate::types::{Coupon, DiscountType};

/// Why a coupon cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum CouponRejection {
    #[error("Coupon code not found")]
    NotFound,

    #[error("Coupon is inactive")]
    Inactive,

    #[error("Coupon is not valid at this time")]
    OutOfWindow,

    #[error("Coupon usage limit reached")]
    UsageLimitReached,

    #[error("Order subtotal is below the coupon minimum of {minimum}")]
    BelowMinimumPurchase { minimum: Money },
}

/// Checks activation, validity window and usage cap.
///
/// The window is inclusive on both ends, so a coupon whose window is a
/// single instant is valid exactly at that instant.
pub fn check_eligibility(coupon: &Coupon, now: DateTime<Utc>) -> Result<(), CouponRejection> {
    if !coupon.is_active {
        return Err(CouponRejection::Inactive);
    }
    if now < coupon.valid_from || now > coupon.valid_until {
        return Err(CouponRejection::OutOfWindow);
    }
    if usage_cap_reached(coupon) {
        return Err(CouponRejection::UsageLimitReached);
    }
    Ok(())
}

/// `usage_limit > 0 && used_count >= usage_limit`.
#[inline]
pub fn usage_cap_reached(coupon: &Coupon) -> bool {
    coupon.usage_limit > 0 && coupon.used_count >= coupon.usage_limit
}

/// Computes the discount a coupon grants on `subtotal`.
///
/// Percentage coupons are capped at `max_discount_cents` when it is set.
/// Fixed coupons are never capped and may exceed the subtotal; clamping the
/// order total is the caller's job.
pub fn compute_discount(coupon: &Coupon, subtotal: Money) -> Money {
    match coupon.discount_type {
        DiscountType::Percentage => {
            let discount = subtotal.percentage_bps(coupon.value);
            let cap = Money::from_cents(coupon.max_discount_cents);
            if cap.is_positive() && discount > cap {
                cap
            } else {
                discount
            }
        }
        DiscountType::Fixed => Money::from_cents(coupon.value),
    }
}

/// Full evaluation of a looked-up coupon.
///
/// `subtotal` is optional so the standalone validation endpoint can check a
/// code before the cart total is known; without it the minimum purchase
/// check is skipped and the discount is zero.
pub fn evaluate(
    coupon: Option<&Coupon>,
    subtotal: Option<Money>,
    now: DateTime<Utc>,
) -> Result<Money, CouponRejection> {
    let coupon = coupon.ok_or(CouponRejection::NotFound)?;
    check_eligibility(coupon, now)?;

    let Some(subtotal) = subtotal else {
        return Ok(Money::zero());
    };

    let minimum = Money::from_cents(coupon.min_purchase_cents);
    if subtotal < minimum {
        return Err(CouponRejection::BelowMinimumPurchase { minimum });
    }

    Ok(compute_discount(coupon, subtotal))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn coupon(discount_type: DiscountType, value: i64) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: "c-1".to_string(),
            code: "SAVE10".to_string(),
            discount_type,
            value,
            min_purchase_cents: 0,
            max_discount_cents: 0,
            usage_limit: 0,
            used_count: 0,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(1),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_percentage_discount_is_capped() {
        // 10% of 1000.00 is 100.00, capped at 80.00
        let mut c = coupon(DiscountType::Percentage, 1000);
        c.max_discount_cents = 8_000;

        let discount = evaluate(Some(&c), Some(Money::from_cents(100_000)), Utc::now());
        assert_eq!(discount, Ok(Money::from_cents(8_000)));
    }

    #[test]
    fn test_percentage_discount_uncapped_when_cap_is_zero() {
        let c = coupon(DiscountType::Percentage, 1000);
        assert_eq!(
            compute_discount(&c, Money::from_cents(100_000)),
            Money::from_cents(10_000)
        );
    }

    #[test]
    fn test_fixed_discount_ignores_cap_and_may_exceed_subtotal() {
        let mut c = coupon(DiscountType::Fixed, 5_000);
        c.max_discount_cents = 100;
        assert_eq!(
            compute_discount(&c, Money::from_cents(3_000)),
            Money::from_cents(5_000)
        );
    }

    #[test]
    fn test_single_instant_window_is_valid_at_that_instant() {
        let instant = Utc::now();
        let mut c = coupon(DiscountType::Fixed, 100);
        c.valid_from = instant;
        c.valid_until = instant;

        assert_eq!(check_eligibility(&c, instant), Ok(()));
        assert_eq!(
            check_eligibility(&c, instant + Duration::milliseconds(1)),
            Err(CouponRejection::OutOfWindow)
        );
        assert_eq!(
            check_eligibility(&c, instant - Duration::milliseconds(1)),
            Err(CouponRejection::OutOfWindow)
        );
    }

    #[test]
    fn test_usage_cap() {
        let mut c = coupon(DiscountType::Fixed, 100);
        c.usage_limit = 2;
        c.used_count = 1;
        assert!(check_eligibility(&c, Utc::now()).is_ok());

        c.used_count = 2;
        assert_eq!(
            check_eligibility(&c, Utc::now()),
            Err(CouponRejection::UsageLimitReached)
        );

        // 0 means unlimited
        c.usage_limit = 0;
        c.used_count = 10_000;
        assert!(check_eligibility(&c, Utc::now()).is_ok());
    }

    #[test]
    fn test_rejection_reasons() {
        let now = Utc::now();
        assert_eq!(evaluate(None, None, now), Err(CouponRejection::NotFound));

        let mut inactive = coupon(DiscountType::Fixed, 100);
        inactive.is_active = false;
        assert_eq!(evaluate(Some(&inactive), None, now), Err(CouponRejection::Inactive));

        let mut minimum = coupon(DiscountType::Fixed, 100);
        minimum.min_purchase_cents = 5_000;
        assert_eq!(
            evaluate(Some(&minimum), Some(Money::from_cents(4_999)), now),
            Err(CouponRejection::BelowMinimumPurchase {
                minimum: Money::from_cents(5_000)
            })
        );
        assert_eq!(
            evaluate(Some(&minimum), Some(Money::from_cents(5_000)), now),
            Ok(Money::from_cents(100))
        );
    }

    #[test]
    fn test_without_subtotal_skips_minimum() {
        let mut c = coupon(DiscountType::Fixed, 100);
        c.min_purchase_cents = 5_000;
        assert_eq!(evaluate(Some(&c), None, Utc::now()), Ok(Money::zero()));
    }
}
