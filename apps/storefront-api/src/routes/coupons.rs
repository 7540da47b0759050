//! Public coupon validation and coupon administration.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use bazaar_checkout::{CouponInput, CouponQuote};
use bazaar_core::{Coupon, Money};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ValidateQuery {
    pub code: String,
    #[serde(default)]
    pub subtotal_cents: Option<i64>,
}

pub async fn validate(
    State(state): State<AppState>,
    Query(query): Query<ValidateQuery>,
) -> ApiResult<Json<CouponQuote>> {
    let subtotal = query.subtotal_cents.map(Money::from_cents);
    Ok(Json(state.coupons.validate(&query.code, subtotal).await?))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Coupon>>> {
    Ok(Json(state.coupons.list().await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Coupon>> {
    Ok(Json(state.coupons.get(&id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CouponInput>,
) -> ApiResult<(StatusCode, Json<Coupon>)> {
    let coupon = state.coupons.create(&input).await?;
    Ok((StatusCode::CREATED, Json(coupon)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<CouponInput>,
) -> ApiResult<Json<Coupon>> {
    Ok(Json(state.coupons.update(&id, &input).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.coupons.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
