//! Tax rate lookup and administration.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use bazaar_checkout::{TaxQuote, TaxRateInput};
use bazaar_core::TaxRateRule;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub country: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub city: String,
}

/// Never fails; unknown locations resolve to a zero rate.
pub async fn resolve(State(state): State<AppState>, Query(query): Query<ResolveQuery>) -> Json<TaxQuote> {
    Json(state.taxes.lookup(&query.country, &query.region, &query.city).await)
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<TaxRateRule>>> {
    Ok(Json(state.taxes.list().await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<TaxRateInput>,
) -> ApiResult<(StatusCode, Json<TaxRateRule>)> {
    let rule = state.taxes.create(&input).await?;
    Ok((StatusCode::CREATED, Json(rule)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<TaxRateInput>,
) -> ApiResult<Json<TaxRateRule>> {
    Ok(Json(state.taxes.update(&id, &input).await?))
}

pub async fn set_default(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.taxes.set_default(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    state.taxes.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
