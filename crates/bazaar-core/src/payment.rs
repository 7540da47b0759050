//! # Payment Reconciliation
//!
//! Aggregates split-tender payments against an order total.
//!
//! ```text
//! total 500.00, payments [200.00]
//!      │
//!      ▼
//! total_paid 200.00 ── remaining 300.00 ── is_fully_paid false ── partial
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::OrderStatus;

/// Result of reconciling payments against a total. Computed on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentSummary {
    pub total_paid: Money,
    pub remaining_balance: Money,
    pub is_fully_paid: bool,
}

/// Sums `payments` against `total`.
///
/// The sum saturates, so tenders too large to add up still read as more
/// than the total and are rejected by [`derive_pos_status`].
pub fn reconcile<I>(total: Money, payments: I) -> PaymentSummary
where
    I: IntoIterator<Item = Money>,
{
    let total_paid = payments
        .into_iter()
        .fold(Money::zero(), Money::saturating_add);
    let remaining_balance = total.saturating_sub(total_paid);

    PaymentSummary {
        total_paid,
        remaining_balance,
        is_fully_paid: !remaining_balance.is_positive(),
    }
}

/// Picks the initial status of a POS order from what was tendered.
///
/// | tendered                 | status      |
/// |--------------------------|-------------|
/// | `paid == 0`              | `pending`   |
/// | `0 < paid < total`       | `partial`   |
/// | `paid == total`          | `completed` |
/// | `paid > total`           | rejected    |
pub fn derive_pos_status(total: Money, summary: &PaymentSummary) -> CoreResult<OrderStatus> {
    if summary.total_paid > total {
        return Err(CoreError::Overpayment {
            total,
            paid: summary.total_paid,
        });
    }

    let status = if summary.total_paid >= total {
        OrderStatus::Completed
    } else if summary.total_paid.is_positive() {
        OrderStatus::Partial
    } else {
        OrderStatus::Pending
    };

    Ok(status)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn cents(values: &[i64]) -> Vec<Money> {
        values.iter().copied().map(Money::from_cents).collect()
    }

    #[test]
    fn test_partial_payment() {
        let total = Money::from_cents(50_000);
        let summary = reconcile(total, cents(&[20_000]));

        assert_eq!(summary.total_paid.cents(), 20_000);
        assert_eq!(summary.remaining_balance.cents(), 30_000);
        assert!(!summary.is_fully_paid);
        assert_eq!(derive_pos_status(total, &summary).unwrap(), OrderStatus::Partial);
    }

    #[test]
    fn test_overpayment_rejected() {
        let total = Money::from_cents(50_000);
        let summary = reconcile(total, cents(&[30_000, 30_000]));

        let err = derive_pos_status(total, &summary).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Overpayment { total: t, paid } if t.cents() == 50_000 && paid.cents() == 60_000
        ));
    }

    #[test]
    fn test_unrepresentable_tender_is_overpayment() {
        let total = Money::from_cents(500);
        let summary = reconcile(total, cents(&[i64::MAX, 2]));

        assert_eq!(summary.total_paid.cents(), i64::MAX);
        assert!(summary.remaining_balance.is_negative());
        assert!(matches!(
            derive_pos_status(total, &summary),
            Err(CoreError::Overpayment { paid, .. }) if paid.cents() == i64::MAX
        ));
    }

    #[test]
    fn test_exact_split_tender_completes() {
        let total = Money::from_cents(50_000);
        let summary = reconcile(total, cents(&[25_000, 15_000, 10_000]));

        assert!(summary.is_fully_paid);
        assert!(summary.remaining_balance.is_zero());
        assert_eq!(derive_pos_status(total, &summary).unwrap(), OrderStatus::Completed);
    }

    #[test]
    fn test_no_payments_is_pending() {
        let total = Money::from_cents(50_000);
        let summary = reconcile(total, Vec::new());

        assert_eq!(summary.remaining_balance, total);
        assert_eq!(derive_pos_status(total, &summary).unwrap(), OrderStatus::Pending);
    }

    #[test]
    fn test_zero_total_with_no_payments_is_completed() {
        let summary = reconcile(Money::zero(), Vec::new());
        assert!(summary.is_fully_paid);
        assert_eq!(
            derive_pos_status(Money::zero(), &summary).unwrap(),
            OrderStatus::Completed
        );
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let total = Money::from_cents(1_000);
        let payments = cents(&[400, 100]);
        assert_eq!(reconcile(total, payments.clone()), reconcile(total, payments));
    }
}
