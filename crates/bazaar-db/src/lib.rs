//! # bazaar-db: Database Layer for Bazaar
//!
//! SQLite access for the checkout engine, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar Data Flow                                 │
//! │                                                                         │
//! │  OrderAssembler::checkout                                              │
//! │       │  pricing snapshot (pool reads)    order transaction (tx)       │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     bazaar-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  product, cart │    │  (embedded)  │  │   │
//! │  │   │               │◄───│  order, coupon │    │              │  │   │
//! │  │   │ SqlitePool    │    │  tax_rate, ... │    │ 001_init.sql │  │   │
//! │  │   └───────────────┘    └───────┬────────┘    └──────────────┘  │   │
//! │  │                                │                                │   │
//! │  │                        ┌───────▼────────┐                       │   │
//! │  │                        │  stock ledger  │  conditional UPDATEs  │   │
//! │  │                        └────────────────┘                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transactions
//!
//! Repository methods that take `tx: &mut Transaction<'_, Sqlite>` run inside
//! the caller's unit of work. Everything else runs on the pool.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bazaar_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./bazaar.db")).await?;
//! let cart = db.carts().list("user-id").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::cart::CartRepository;
pub use repository::coupon::CouponRepository;
pub use repository::order::{OrderRepository, PosOrderFilter};
pub use repository::product::ProductRepository;
pub use repository::setting::SettingRepository;
pub use repository::stock::{self as stock_ledger, Reservation};
pub use repository::tax_rate::TaxRateRepository;
pub use repository::user::UserRepository;
