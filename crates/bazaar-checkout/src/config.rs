//! Checkout configuration.
//!
//! Loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;

/// Default flat shipping cost when no `shipping_cost` setting exists.
pub const DEFAULT_SHIPPING_CENTS: i64 = 0;

/// E-mail identifying the synthetic POS walk-in customer.
pub const DEFAULT_WALK_IN_EMAIL: &str = "walkin@bazaar.local";

pub const DEFAULT_WALK_IN_NAME: &str = "Walk-in Customer";

/// Order engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Shipping cost in cents used when the settings table has none
    pub default_shipping_cents: i64,

    /// Walk-in customer e-mail (unique key of the synthetic user)
    pub walk_in_email: String,

    /// Walk-in customer display name
    pub walk_in_name: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        CheckoutConfig {
            default_shipping_cents: DEFAULT_SHIPPING_CENTS,
            walk_in_email: DEFAULT_WALK_IN_EMAIL.to_string(),
            walk_in_name: DEFAULT_WALK_IN_NAME.to_string(),
        }
    }
}

impl CheckoutConfig {
    /// Load configuration from environment variables.
    ///
    /// - `BAZAAR_DEFAULT_SHIPPING_CENTS`
    /// - `BAZAAR_WALK_IN_EMAIL`
    /// - `BAZAAR_WALK_IN_NAME`
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_shipping_cents: i64 = match lookup("BAZAAR_DEFAULT_SHIPPING_CENTS") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("BAZAAR_DEFAULT_SHIPPING_CENTS".to_string()))?,
            None => DEFAULT_SHIPPING_CENTS,
        };

        if default_shipping_cents < 0 {
            return Err(ConfigError::InvalidValue(
                "BAZAAR_DEFAULT_SHIPPING_CENTS".to_string(),
            ));
        }

        let walk_in_email = lookup("BAZAAR_WALK_IN_EMAIL")
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| DEFAULT_WALK_IN_EMAIL.to_string());

        if walk_in_email.is_empty() {
            return Err(ConfigError::MissingRequired("BAZAAR_WALK_IN_EMAIL".to_string()));
        }

        let walk_in_name = lookup("BAZAAR_WALK_IN_NAME")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_WALK_IN_NAME.to_string());

        Ok(CheckoutConfig {
            default_shipping_cents,
            walk_in_email,
            walk_in_name,
        })
    }

    pub fn default_shipping_cents(mut self, cents: i64) -> Self {
        self.default_shipping_cents = cents;
        self
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = CheckoutConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.default_shipping_cents, 0);
        assert_eq!(config.walk_in_email, DEFAULT_WALK_IN_EMAIL);
        assert_eq!(config.walk_in_name, "Walk-in Customer");
    }

    #[test]
    fn test_overrides() {
        let config = CheckoutConfig::from_lookup(lookup(&[
            ("BAZAAR_DEFAULT_SHIPPING_CENTS", "1500"),
            ("BAZAAR_WALK_IN_EMAIL", "pos@shop.test"),
        ]))
        .unwrap();
        assert_eq!(config.default_shipping_cents, 1_500);
        assert_eq!(config.walk_in_email, "pos@shop.test");
    }

    #[test]
    fn test_invalid_shipping_rejected() {
        assert!(matches!(
            CheckoutConfig::from_lookup(lookup(&[("BAZAAR_DEFAULT_SHIPPING_CENTS", "ten")])),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(CheckoutConfig::from_lookup(lookup(&[("BAZAAR_DEFAULT_SHIPPING_CENTS", "-1")])).is_err());
        assert!(matches!(
            CheckoutConfig::from_lookup(lookup(&[("BAZAAR_WALK_IN_EMAIL", "  ")])),
            Err(ConfigError::MissingRequired(_))
        ));
    }
}
