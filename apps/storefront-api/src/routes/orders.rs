//! Storefront checkout and order history.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use bazaar_core::{Address, Order, OrderDetails};

use super::{CurrentUser, PageQuery};
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(flatten)]
    pub address: Address,
    #[serde(default)]
    pub coupon_code: Option<String>,
}

pub async fn checkout(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<OrderDetails>)> {
    let order = state
        .orders
        .checkout(&user_id, &request.address, request.coupon_code.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Vec<Order>>> {
    let orders = state
        .orders
        .list_orders_for_user(&user_id, page.page, page.limit)
        .await?;
    Ok(Json(orders))
}

pub async fn get(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<OrderDetails>> {
    Ok(Json(state.orders.get_order_for_user(&user_id, &id).await?))
}
