//! # Money Module
//!
//! Integer money for every amount that crosses the checkout engine.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Where Money flows during an order                                      │
//! │                                                                         │
//! │  unit price × qty ──► subtotal ──┬──► tax (rate in bps)                │
//! │                                  ├──► discount (coupon)                 │
//! │                                  └──► total ◄── shipping                │
//! │                                                 │                       │
//! │                              payments ─────────►│ reconciliation        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts are minor units (cents). Rates and percentage discounts are basis
//! points, so `(amount × bps + 5000) / 10000` is the only rounding step.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

/// Denominator for basis point arithmetic (100% = 10000 bps).
const BPS_SCALE: i128 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// Signed so intermediate results (for example a fixed coupon larger than
/// the subtotal) can be represented before they are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps negative values to zero.
    ///
    /// ```rust
    /// use bazaar_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(-250).non_negative(), Money::zero());
    /// assert_eq!(Money::from_cents(250).non_negative().cents(), 250);
    /// ```
    #[inline]
    pub fn non_negative(self) -> Self {
        Money(self.0.max(0))
    }

    /// Calculates tax at the given rate, rounding half up.
    ///
    /// ```rust
    /// use bazaar_core::money::Money;
    /// use bazaar_core::types::TaxRate;
    ///
    /// // $10.00 at 8.25% = $0.825 → $0.83
    /// let tax = Money::from_cents(1000).calculate_tax(TaxRate::from_bps(825));
    /// assert_eq!(tax.cents(), 83);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        self.percentage_bps(rate.bps() as i64)
    }

    /// Returns `bps / 10000` of this amount, rounding half up.
    ///
    /// Used for percentage coupons, where 1000 bps is 10% off.
    pub fn percentage_bps(&self, bps: i64) -> Money {
        // i128 so large subtotals cannot overflow the intermediate product
        let cents = (self.0 as i128 * bps as i128 + BPS_SCALE / 2) / BPS_SCALE;
        Money(cents as i64)
    }

    /// Adds, pinning at `i64::MAX` instead of wrapping.
    ///
    /// Client-supplied amounts go through this so a sum that cannot be
    /// represented still compares greater than any real total.
    #[inline]
    pub const fn saturating_add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }

    #[inline]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }

    /// Multiplies money by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Human-readable form for logs and error messages.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
        assert_eq!(Money::from_cents(500).to_string(), "$5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!(a.multiply_quantity(4).cents(), 4000);
    }

    #[test]
    fn test_tax_rounds_half_up() {
        let amount = Money::from_cents(1000);
        assert_eq!(amount.calculate_tax(TaxRate::from_bps(1000)).cents(), 100);
        assert_eq!(amount.calculate_tax(TaxRate::from_bps(825)).cents(), 83);
        assert_eq!(amount.calculate_tax(TaxRate::zero()).cents(), 0);
    }

    #[test]
    fn test_percentage_bps() {
        // 10% of $1000.00
        assert_eq!(Money::from_cents(100_000).percentage_bps(1000).cents(), 10_000);
        // 15% of $0.99 = 14.85 → 15
        assert_eq!(Money::from_cents(99).percentage_bps(1500).cents(), 15);
    }

    #[test]
    fn test_saturating_arithmetic() {
        let max = Money::from_cents(i64::MAX);
        assert_eq!(max.saturating_add(Money::from_cents(2)), max);
        assert_eq!(
            Money::from_cents(500).saturating_sub(max).cents(),
            500 - i64::MAX
        );
        assert_eq!(Money::from_cents(-2).saturating_sub(max).cents(), i64::MIN);
    }

    #[test]
    fn test_large_amounts_do_not_overflow() {
        let huge = Money::from_cents(i64::MAX / 2);
        let tax = huge.calculate_tax(TaxRate::from_bps(10_000));
        assert_eq!(tax, huge);
    }

    #[test]
    fn test_sum_and_clamp() {
        let paid: Money = [Money::from_cents(300), Money::from_cents(200)].iter().sum();
        assert_eq!(paid.cents(), 500);
        assert_eq!((paid - Money::from_cents(900)).non_negative(), Money::zero());
    }
}
