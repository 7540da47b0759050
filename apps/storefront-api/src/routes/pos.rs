//! POS till endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::debug;

use bazaar_checkout::{PosOrderPage, PosOrderRequest, PosOrderView};
use bazaar_core::OrderStatus;
use bazaar_db::PosOrderFilter;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PosListQuery {
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl From<PosListQuery> for PosOrderFilter {
    fn from(query: PosListQuery) -> Self {
        let defaults = PosOrderFilter::default();
        PosOrderFilter {
            status: query.status,
            page: query.page.unwrap_or(defaults.page),
            limit: query.limit.unwrap_or(defaults.limit),
        }
    }
}

pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<PosOrderRequest>,
) -> ApiResult<(StatusCode, Json<PosOrderView>)> {
    debug!(lines = request.items.len(), payments = request.payments.len(), "POS order requested");
    let view = state.orders.create_pos_order(request).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PosListQuery>,
) -> ApiResult<Json<PosOrderPage>> {
    Ok(Json(state.orders.list_pos_orders(&query.into()).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<PosOrderView>> {
    Ok(Json(state.orders.get_pos_order(&id).await?))
}
