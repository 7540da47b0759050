//! Shared application state.

use std::sync::Arc;

use bazaar_checkout::{
    AuditSink, CacheInvalidator, CartService, CheckoutConfig, CouponService, NoopCache, OrderAssembler,
    TaxRateService, TracingAuditSink,
};
use bazaar_db::Database;

/// Services handed to every handler. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub orders: OrderAssembler,
    pub carts: CartService,
    pub coupons: CouponService,
    pub taxes: TaxRateService,
}

impl AppState {
    /// State without a cache, auditing to the tracing log.
    pub fn new(db: Database, config: CheckoutConfig) -> Self {
        Self::with_collaborators(db, Arc::new(NoopCache), Arc::new(TracingAuditSink), config)
    }

    pub fn with_collaborators(
        db: Database,
        cache: Arc<dyn CacheInvalidator>,
        audit: Arc<dyn AuditSink>,
        config: CheckoutConfig,
    ) -> Self {
        AppState {
            orders: OrderAssembler::new(db.clone(), cache, audit, config),
            carts: CartService::new(db.clone()),
            coupons: CouponService::new(db.clone()),
            taxes: TaxRateService::new(db.clone()),
            db,
        }
    }
}
