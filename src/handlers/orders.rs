//! Order endpoints. Plain JSON bodies; no file handling here.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::orders::order::{Order, OrderInput, OrderPatch};
use crate::orders::service::OrderPage;
use crate::response::ApiResponse;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /orders - paginated listing, no filter dimension
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<ApiResponse<OrderPage>, ApiError> {
    let page = state.orders.list(query.page, query.limit).await?;
    Ok(ApiResponse::success(page))
}

/// POST /orders
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<OrderInput>,
) -> Result<ApiResponse<Order>, ApiError> {
    let order = state.orders.create(input).await?;
    Ok(ApiResponse::created(order))
}

/// GET /orders/:id
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Order>, ApiError> {
    let order = state.orders.find_by_id(id).await?;
    Ok(ApiResponse::success(order))
}

/// PUT /orders/:id - partial replace of provided fields
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<OrderPatch>,
) -> Result<ApiResponse<Order>, ApiError> {
    let order = state.orders.update_by_id(id, patch).await?;
    Ok(ApiResponse::success(order))
}

/// DELETE /orders/:id
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ApiResponse<Value>, ApiError> {
    let deleted = state.orders.delete_by_id(id).await?;
    Ok(ApiResponse::success(json!({ "deleted": deleted.id })))
}
