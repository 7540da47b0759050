//! Shared fixtures for the file-backed integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tempfile::TempDir;

use bazaar_checkout::{CheckoutConfig, MemoryAuditSink, OrderAssembler, RecordingCache};
use bazaar_core::{Address, Coupon, DiscountType, Product, TaxRateRule, User, VariationSelection};
use bazaar_db::{Database, DbConfig};

pub struct Harness {
    // Dropping the directory deletes the database file.
    _dir: TempDir,
    pub db: Database,
    pub cache: Arc<RecordingCache>,
    pub audit: Arc<MemoryAuditSink>,
    pub assembler: OrderAssembler,
}

/// File database with a multi-connection pool so transactions really race.
pub async fn harness() -> Harness {
    let dir = TempDir::new().unwrap();
    let config = DbConfig::new(dir.path().join("bazaar.db"))
        .max_connections(8)
        .busy_timeout(std::time::Duration::from_secs(30));
    let db = Database::new(config).await.unwrap();

    let cache = Arc::new(RecordingCache::new());
    let audit = Arc::new(MemoryAuditSink::new());
    let assembler = OrderAssembler::new(
        db.clone(),
        cache.clone(),
        audit.clone(),
        CheckoutConfig::default().default_shipping_cents(1_000),
    );

    Harness {
        _dir: dir,
        db,
        cache,
        audit,
        assembler,
    }
}

pub async fn product(db: &Database, sku: &str, price_cents: i64, stock: i64, pos_stock: i64) -> Product {
    let now = Utc::now();
    let product = Product {
        id: uuid::Uuid::new_v4().to_string(),
        sku: sku.to_string(),
        name: sku.to_string(),
        price_cents,
        stock,
        pos_stock,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    db.products().insert(&product).await.unwrap();
    product
}

pub async fn customer(db: &Database, n: usize) -> User {
    db.users()
        .create(&format!("customer{n}@example.com"), &format!("Customer {n}"))
        .await
        .unwrap()
}

pub async fn coupon_in_window(
    db: &Database,
    code: &str,
    discount_type: DiscountType,
    value: i64,
    usage_limit: i64,
    valid_from: DateTime<Utc>,
    valid_until: DateTime<Utc>,
) -> Coupon {
    let now = Utc::now();
    let coupon = Coupon {
        id: uuid::Uuid::new_v4().to_string(),
        code: code.to_string(),
        discount_type,
        value,
        min_purchase_cents: 0,
        max_discount_cents: 0,
        usage_limit,
        used_count: 0,
        valid_from,
        valid_until,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    db.coupons().insert(&coupon).await.unwrap();
    coupon
}

pub async fn coupon(db: &Database, code: &str, discount_type: DiscountType, value: i64, usage_limit: i64) -> Coupon {
    let now = Utc::now();
    coupon_in_window(
        db,
        code,
        discount_type,
        value,
        usage_limit,
        now - Duration::days(1),
        now + Duration::days(1),
    )
    .await
}

pub async fn tax_rule(db: &Database, country: &str, region: &str, city: &str, rate_bps: u32, is_default: bool) -> TaxRateRule {
    let now = Utc::now();
    let rule = TaxRateRule {
        id: uuid::Uuid::new_v4().to_string(),
        country: country.to_string(),
        region: region.to_string(),
        city: city.to_string(),
        rate_bps,
        is_default,
        created_at: now,
        updated_at: now,
    };
    db.tax_rates().create(&rule).await.unwrap();
    rule
}

pub async fn fill_cart(db: &Database, user: &User, product: &Product, quantity: i64) {
    db.carts()
        .add(&user.id, &product.id, quantity, &VariationSelection::new())
        .await
        .unwrap();
}

pub fn dhaka() -> Address {
    Address {
        address: "House 12, Road 5".to_string(),
        city: "Dhaka".to_string(),
        region: "Dhaka".to_string(),
        postal_code: "1205".to_string(),
        country: "BD".to_string(),
    }
}
