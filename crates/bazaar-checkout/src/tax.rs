//! # Tax Rate Service
//!
//! Location lookup for checkout plus the admin operations on tax rules.
//! Lookup is total: a store failure is logged and resolves to a zero rate.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use ts_rs::TS;

use bazaar_core::tax::{resolve_tax_rule, TaxMatch};
use bazaar_core::validation::validate_tax_rate_bps;
use bazaar_core::{TaxRate, TaxRateRule, ValidationError};
use bazaar_db::Database;

use crate::error::{CheckoutError, CheckoutResult};

/// Admin input for creating or replacing a tax rule.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRateInput {
    pub country: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub city: String,
    pub rate_bps: u32,
    #[serde(default)]
    pub is_default: bool,
}

impl TaxRateInput {
    fn validated(&self) -> CheckoutResult<TaxRateInput> {
        let country = self.country.trim();
        if country.is_empty() {
            return Err(ValidationError::required("country").into());
        }
        validate_tax_rate_bps(self.rate_bps)?;

        Ok(TaxRateInput {
            country: country.to_string(),
            region: self.region.trim().to_string(),
            city: self.city.trim().to_string(),
            rate_bps: self.rate_bps,
            is_default: self.is_default,
        })
    }
}

/// Result of a public location lookup.
#[derive(Debug, Clone, Serialize)]
pub struct TaxQuote {
    pub rate: TaxRate,
    pub matched: TaxMatch,
    pub rule_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TaxRateService {
    db: Database,
}

impl TaxRateService {
    pub fn new(db: Database) -> Self {
        TaxRateService { db }
    }

    /// Rate for a destination. Never fails.
    pub async fn resolve(&self, country: &str, region: &str, city: &str) -> TaxRate {
        self.lookup(country, region, city).await.rate
    }

    /// Rate for a destination together with the rule that produced it.
    pub async fn lookup(&self, country: &str, region: &str, city: &str) -> TaxQuote {
        let rules = match self.db.tax_rates().candidates(country).await {
            Ok(rules) => rules,
            Err(e) => {
                warn!(error = %e, country = %country, "Tax rate lookup failed, using zero rate");
                return TaxQuote {
                    rate: TaxRate::zero(),
                    matched: TaxMatch::None,
                    rule_id: None,
                };
            }
        };

        let (rule, matched) = resolve_tax_rule(&rules, country, region, city);
        TaxQuote {
            rate: rule.map(TaxRateRule::rate).unwrap_or_default(),
            matched,
            rule_id: rule.map(|r| r.id.clone()),
        }
    }

    // -------------------------------------------------------------------------
    // Administration
    // -------------------------------------------------------------------------

    pub async fn list(&self) -> CheckoutResult<Vec<TaxRateRule>> {
        Ok(self.db.tax_rates().list().await?)
    }

    pub async fn create(&self, input: &TaxRateInput) -> CheckoutResult<TaxRateRule> {
        let input = input.validated()?;
        let now = Utc::now();
        let rule = TaxRateRule {
            id: uuid::Uuid::new_v4().to_string(),
            country: input.country,
            region: input.region,
            city: input.city,
            rate_bps: input.rate_bps,
            is_default: input.is_default,
            created_at: now,
            updated_at: now,
        };

        self.db.tax_rates().create(&rule).await?;
        info!(id = %rule.id, rate_bps = rule.rate_bps, is_default = rule.is_default, "Tax rate created");
        Ok(rule)
    }

    pub async fn update(&self, id: &str, input: &TaxRateInput) -> CheckoutResult<TaxRateRule> {
        let input = input.validated()?;
        let existing = self
            .db
            .tax_rates()
            .get(id)
            .await?
            .ok_or_else(|| CheckoutError::not_found("TaxRate", id))?;

        let rule = TaxRateRule {
            country: input.country,
            region: input.region,
            city: input.city,
            rate_bps: input.rate_bps,
            is_default: input.is_default,
            updated_at: Utc::now(),
            ..existing
        };

        self.db.tax_rates().update(&rule).await?;
        Ok(rule)
    }

    pub async fn set_default(&self, id: &str) -> CheckoutResult<()> {
        Ok(self.db.tax_rates().set_default(id).await?)
    }

    pub async fn delete(&self, id: &str) -> CheckoutResult<()> {
        Ok(self.db.tax_rates().delete(id).await?)
    }
}
