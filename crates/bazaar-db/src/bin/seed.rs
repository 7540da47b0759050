//! # Seed Data Generator
//!
//! Populates a development database with a catalog, tax rules, coupons and
//! a demo customer.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p bazaar-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p bazaar-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p bazaar-db --bin seed -- --db ./data/bazaar.db
//! ```
//!
//! ## Generated Data
//! - Products across apparel categories, each with online and showroom stock
//! - A "Size" variation on every product and a "Color" variation on some
//! - Tax rules: 5% default, 10% for BD, 7.5% for BD/Dhaka, 8% for BD/Dhaka/Gulshan
//! - Coupons: WELCOME10 (10%, capped at $80) and FLAT5 ($5 off, 100 uses)
//! - `shipping_cost` = 1000 cents
//! - Demo customer `demo@bazaar.local`

use bazaar_core::{Coupon, DiscountType, Product, TaxRateRule, SHIPPING_COST_SETTING};
use bazaar_db::{Database, DbConfig};
use chrono::{Duration, Utc};
use std::env;
use uuid::Uuid;

/// Product categories for realistic test data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "TOP",
        &[
            "Cotton Tee",
            "Linen Shirt",
            "Polo Shirt",
            "Hoodie",
            "Panjabi",
            "Kurta",
            "Denim Jacket",
            "Sweater",
        ],
    ),
    (
        "BTM",
        &[
            "Chino Pants",
            "Jeans",
            "Joggers",
            "Cargo Shorts",
            "Lungi",
            "Pajama",
        ],
    ),
    (
        "ACC",
        &[
            "Leather Belt",
            "Canvas Tote",
            "Cap",
            "Scarf",
            "Wallet",
            "Sunglasses",
        ],
    ),
    (
        "FTW",
        &["Sneakers", "Sandals", "Loafers", "Boots", "Slides"],
    ),
];

/// Size options and their price modifiers in cents
const SIZES: &[(&str, i64)] = &[("S", 0), ("M", 0), ("L", 200), ("XL", 400)];

/// Color options for every third product
const COLORS: &[(&str, i64)] = &[("Black", 0), ("White", 0), ("Indigo", 150)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./bazaar_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bazaar Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./bazaar_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Bazaar Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Catalog
    println!();
    println!("Generating products...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    let catalog: Vec<(&str, &str)> = CATEGORIES
        .iter()
        .flat_map(|(code, names)| names.iter().map(move |name| (*code, *name)))
        .collect();

    for seed in 0..count {
        let (category_code, name) = catalog[seed % catalog.len()];
        let product = generate_product(category_code, name, seed / catalog.len(), seed);

        if let Err(e) = db.products().insert(&product).await {
            eprintln!("Failed to insert {}: {}", product.sku, e);
            continue;
        }

        db.products().add_variation(&product.id, "Size", SIZES).await?;
        if seed % 3 == 0 {
            db.products().add_variation(&product.id, "Color", COLORS).await?;
        }

        generated += 1;
        if generated % 50 == 0 {
            println!("  Generated {} products...", generated);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    // Tax rules
    println!();
    println!("Creating tax rules...");
    for (country, region, city, rate_bps, is_default) in [
        ("*", "", "", 500, true),
        ("BD", "", "", 1_000, false),
        ("BD", "Dhaka", "", 750, false),
        ("BD", "Dhaka", "Gulshan", 800, false),
    ] {
        let now = Utc::now();
        db.tax_rates()
            .create(&TaxRateRule {
                id: Uuid::new_v4().to_string(),
                country: country.to_string(),
                region: region.to_string(),
                city: city.to_string(),
                rate_bps,
                is_default,
                created_at: now,
                updated_at: now,
            })
            .await?;
    }
    println!("✓ 4 tax rules");

    // Coupons
    println!();
    println!("Creating coupons...");
    for (code, discount_type, value, max_discount_cents, usage_limit) in [
        ("WELCOME10", DiscountType::Percentage, 1_000, 8_000, 0),
        ("FLAT5", DiscountType::Fixed, 500, 0, 100),
    ] {
        let now = Utc::now();
        db.coupons()
            .insert(&Coupon {
                id: Uuid::new_v4().to_string(),
                code: code.to_string(),
                discount_type,
                value,
                min_purchase_cents: 0,
                max_discount_cents,
                usage_limit,
                used_count: 0,
                valid_from: now - Duration::days(1),
                valid_until: now + Duration::days(365),
                is_active: true,
                created_at: now,
                updated_at: now,
            })
            .await?;
        println!("  {}", code);
    }

    db.settings().set(SHIPPING_COST_SETTING, "1000").await?;
    println!("✓ shipping_cost = 1000");

    let customer = db.users().create("demo@bazaar.local", "Demo Customer").await?;
    println!("✓ Demo customer: {}", customer.id);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with realistic data.
fn generate_product(category: &str, name: &str, edition: usize, seed: usize) -> Product {
    let now = Utc::now();

    let prefix: String = name.replace(' ', "").chars().take(3).collect();
    let sku = format!("{}-{}-{:04}", category, prefix.to_uppercase(), seed);

    // Price: $9.99 - $89.99
    let price_cents = 999 + ((seed * 37) % 8_000) as i64;

    Product {
        id: Uuid::new_v4().to_string(),
        sku,
        name: if edition == 0 {
            name.to_string()
        } else {
            format!("{} Vol. {}", name, edition + 1)
        },
        price_cents,
        stock: (seed % 60) as i64,
        pos_stock: (seed % 15) as i64,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
