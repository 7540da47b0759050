//! # Cache Invalidation
//!
//! The storefront caches product pages, product listings and dashboard
//! stats. Orders change stock and sales figures, so after a commit the
//! engine drops the affected keys:
//!
//! ```text
//! product:<id>        one per ordered product
//! products:list:*     every cached listing page (prefix)
//! dashboard:stats     admin dashboard aggregates
//! ```
//!
//! Invalidation is best-effort. Implementations must not block and must
//! swallow their own failures: the order is already committed.

use std::collections::BTreeSet;

pub const PRODUCTS_LIST_PREFIX: &str = "products:list:";
pub const DASHBOARD_STATS_KEY: &str = "dashboard:stats";

pub fn product_key(product_id: &str) -> String {
    format!("product:{}", product_id)
}

/// Cache handle injected into the order engine.
pub trait CacheInvalidator: Send + Sync {
    fn invalidate(&self, key: &str);

    fn invalidate_prefix(&self, prefix: &str);
}

/// Drops every key an order for `product_ids` makes stale.
pub(crate) fn invalidate_after_order<'a, I>(cache: &dyn CacheInvalidator, product_ids: I)
where
    I: IntoIterator<Item = &'a str>,
{
    let unique: BTreeSet<&str> = product_ids.into_iter().collect();
    for id in unique {
        cache.invalidate(&product_key(id));
    }
    cache.invalidate_prefix(PRODUCTS_LIST_PREFIX);
    cache.invalidate(DASHBOARD_STATS_KEY);
}

/// For deployments without a cache.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

impl CacheInvalidator for NoopCache {
    fn invalidate(&self, _key: &str) {}

    fn invalidate_prefix(&self, _prefix: &str) {}
}

/// Records invalidations in memory. Prefixes are stored with a trailing `*`.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Default)]
pub struct RecordingCache {
    keys: std::sync::Mutex<Vec<String>>,
}

#[cfg(any(test, feature = "test-util"))]
impl RecordingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidated keys, in call order.
    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn push(&self, key: String) {
        self.keys.lock().unwrap_or_else(|e| e.into_inner()).push(key);
    }
}

#[cfg(any(test, feature = "test-util"))]
impl CacheInvalidator for RecordingCache {
    fn invalidate(&self, key: &str) {
        self.push(key.to_string());
    }

    fn invalidate_prefix(&self, prefix: &str) {
        self.push(format!("{}*", prefix));
    }
}
