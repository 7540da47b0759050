//! Cart maintenance for the calling user.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use bazaar_checkout::AddCartItem;
use bazaar_core::CartLine;

use super::CurrentUser;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateQuantity {
    pub quantity: i64,
}

pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Json<Vec<CartLine>>> {
    Ok(Json(state.carts.list(&user_id).await?))
}

pub async fn add(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(item): Json<AddCartItem>,
) -> ApiResult<(StatusCode, Json<CartLine>)> {
    let line = state.carts.add_item(&user_id, item).await?;
    Ok((StatusCode::CREATED, Json(line)))
}

pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(line_id): Path<String>,
    Json(body): Json<UpdateQuantity>,
) -> ApiResult<Json<CartLine>> {
    Ok(Json(state.carts.update_item(&user_id, &line_id, body.quantity).await?))
}

pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(line_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.carts.remove_item(&user_id, &line_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
