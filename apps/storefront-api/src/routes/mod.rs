//! Router assembly and shared extractors.

mod cart;
mod coupons;
mod orders;
mod pos;
mod tax;

use axum::{
    extract::{FromRequestParts, State},
    http::{request::Parts, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the authenticated user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/orders", post(orders::checkout).get(orders::list))
        .route("/orders/{id}", get(orders::get))
        .route("/cart", get(cart::list).post(cart::add))
        .route("/cart/{line_id}", put(cart::update).delete(cart::remove))
        .route("/pos/orders", post(pos::create).get(pos::list))
        .route("/pos/orders/{id}", get(pos::get))
        .route("/coupons/validate", get(coupons::validate))
        .route("/admin/coupons", get(coupons::list).post(coupons::create))
        .route(
            "/admin/coupons/{id}",
            get(coupons::get).put(coupons::update).delete(coupons::delete),
        )
        .route("/tax-rates/resolve", get(tax::resolve))
        .route("/admin/tax-rates", get(tax::list).post(tax::create))
        .route("/admin/tax-rates/{id}", put(tax::update).delete(tax::delete))
        .route("/admin/tax-rates/{id}/default", post(tax::set_default))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    if state.db.health_check().await {
        (StatusCode::OK, Json(json!({ "status": "ok" })))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "status": "degraded" })))
    }
}

/// The caller, from the `x-user-id` header.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| CurrentUser(v.to_string()))
            .ok_or_else(|| ApiError::unauthorized("Missing x-user-id header"))
    }
}

/// `?page=&limit=` with 1-based pages.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn first_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}
