//! # Bazaar Storefront API
//!
//! Thin axum layer over `bazaar-checkout`. Handlers parse the request, call
//! one service method and map the outcome to JSON.
//!
//! ## Routes
//! ```text
//! GET    /health
//! POST   /orders                         checkout the caller's cart
//! GET    /orders                         caller's order history
//! GET    /orders/{id}
//! GET    /cart          POST /cart
//! PUT    /cart/{line_id}  DELETE /cart/{line_id}
//! POST   /pos/orders    GET /pos/orders  GET /pos/orders/{id}
//! GET    /coupons/validate?code=&subtotal_cents=
//! GET    /tax-rates/resolve?country=&region=&city=
//! *      /admin/coupons[/{id}]
//! *      /admin/tax-rates[/{id}[/default]]
//! ```
//!
//! The caller is identified by the `x-user-id` header. Authentication
//! happens upstream.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::router;
pub use state::AppState;
