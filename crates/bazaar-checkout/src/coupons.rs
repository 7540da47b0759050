//! # Coupon Service
//!
//! Standalone coupon validation for the storefront (reports *why* a code is
//! rejected) and coupon administration. Order creation does not go through
//! [`CouponService::validate`]: it silently drops a coupon that does not
//! apply.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use bazaar_core::coupon::evaluate;
use bazaar_core::validation::{validate_coupon_code, validate_coupon_terms};
use bazaar_core::{Coupon, CouponRejection, DiscountType, Money};
use bazaar_db::Database;

use crate::error::{CheckoutError, CheckoutResult};

/// A coupon that passed validation.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct CouponQuote {
    pub code: String,
    pub discount_type: DiscountType,
    pub value: i64,
    pub min_purchase: Money,
    /// Discount on the supplied subtotal; zero when no subtotal was given.
    pub discount: Money,
}

/// Admin input for creating or replacing a coupon.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CouponInput {
    pub code: String,
    pub discount_type: DiscountType,
    /// Basis points for percentage coupons, cents for fixed ones.
    pub value: i64,
    #[serde(default)]
    pub min_purchase_cents: i64,
    #[serde(default)]
    pub max_discount_cents: i64,
    #[serde(default)]
    pub usage_limit: i64,
    #[ts(as = "String")]
    pub valid_from: DateTime<Utc>,
    #[ts(as = "String")]
    pub valid_until: DateTime<Utc>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl CouponInput {
    fn validated_code(&self) -> CheckoutResult<String> {
        validate_coupon_terms(
            self.discount_type,
            self.value,
            self.min_purchase_cents,
            self.max_discount_cents,
            self.usage_limit,
            self.valid_from,
            self.valid_until,
        )?;
        Ok(validate_coupon_code(&self.code)?)
    }
}

#[derive(Debug, Clone)]
pub struct CouponService {
    db: Database,
}

impl CouponService {
    pub fn new(db: Database) -> Self {
        CouponService { db }
    }

    /// Validates `code`, optionally against a subtotal.
    ///
    /// An unknown code is `NotFound`; every other failure is
    /// `CouponRejected` with the specific reason.
    pub async fn validate(&self, code: &str, subtotal: Option<Money>) -> CheckoutResult<CouponQuote> {
        let code = validate_coupon_code(code)?;
        let coupon = self.db.coupons().get_by_code(&code).await?;

        match evaluate(coupon.as_ref(), subtotal, Utc::now()) {
            Ok(discount) => {
                let coupon = coupon.ok_or_else(|| CheckoutError::not_found("Coupon", &code))?;
                Ok(CouponQuote {
                    code: coupon.code,
                    discount_type: coupon.discount_type,
                    value: coupon.value,
                    min_purchase: Money::from_cents(coupon.min_purchase_cents),
                    discount,
                })
            }
            Err(CouponRejection::NotFound) => Err(CheckoutError::not_found("Coupon", code)),
            Err(rejection) => {
                debug!(code = %code, reason = %rejection, "Coupon rejected");
                Err(rejection.into())
            }
        }
    }

    // -------------------------------------------------------------------------
    // Administration
    // -------------------------------------------------------------------------

    pub async fn list(&self) -> CheckoutResult<Vec<Coupon>> {
        Ok(self.db.coupons().list().await?)
    }

    pub async fn get(&self, id: &str) -> CheckoutResult<Coupon> {
        self.db
            .coupons()
            .get(id)
            .await?
            .ok_or_else(|| CheckoutError::not_found("Coupon", id))
    }

    pub async fn create(&self, input: &CouponInput) -> CheckoutResult<Coupon> {
        let code = input.validated_code()?;
        let now = Utc::now();
        let coupon = Coupon {
            id: uuid::Uuid::new_v4().to_string(),
            code,
            discount_type: input.discount_type,
            value: input.value,
            min_purchase_cents: input.min_purchase_cents,
            max_discount_cents: input.max_discount_cents,
            usage_limit: input.usage_limit,
            used_count: 0,
            valid_from: input.valid_from,
            valid_until: input.valid_until,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        };

        self.db.coupons().insert(&coupon).await?;
        info!(code = %coupon.code, id = %coupon.id, "Coupon created");
        Ok(coupon)
    }

    /// Replaces the terms of a coupon. Its usage counter is preserved.
    pub async fn update(&self, id: &str, input: &CouponInput) -> CheckoutResult<Coupon> {
        let code = input.validated_code()?;
        let existing = self.get(id).await?;

        let coupon = Coupon {
            code,
            discount_type: input.discount_type,
            value: input.value,
            min_purchase_cents: input.min_purchase_cents,
            max_discount_cents: input.max_discount_cents,
            usage_limit: input.usage_limit,
            valid_from: input.valid_from,
            valid_until: input.valid_until,
            is_active: input.is_active,
            updated_at: Utc::now(),
            ..existing
        };

        self.db.coupons().update(&coupon).await?;
        Ok(coupon)
    }

    pub async fn delete(&self, id: &str) -> CheckoutResult<()> {
        Ok(self.db.coupons().delete(id).await?)
    }
}
