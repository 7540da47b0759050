//! Storefront API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use bazaar_checkout::CheckoutConfig;

/// Storefront API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Connection pool size
    pub db_max_connections: u32,

    /// Order engine settings
    pub checkout: CheckoutConfig,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// - `BAZAAR_HTTP_PORT` (default 8080)
    /// - `BAZAAR_DATABASE_PATH` (default `./bazaar.db`)
    /// - `BAZAAR_DB_MAX_CONNECTIONS` (default 5)
    /// - plus everything [`CheckoutConfig::load`] reads
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let http_port = lookup("BAZAAR_HTTP_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue("BAZAAR_HTTP_PORT".to_string()))?;

        let database_path = lookup("BAZAAR_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./bazaar.db"));

        let db_max_connections: u32 = lookup("BAZAAR_DB_MAX_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue("BAZAAR_DB_MAX_CONNECTIONS".to_string()))?;

        if db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("BAZAAR_DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(ApiConfig {
            http_port,
            database_path,
            db_max_connections,
            checkout: CheckoutConfig::from_lookup(lookup)?,
        })
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error(transparent)]
    Checkout(#[from] bazaar_checkout::ConfigError),
}
