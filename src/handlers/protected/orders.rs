// handlers/protected/orders.rs - Order back office

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{Order, OrderFilter};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::types::OrderStatus;

/// GET /api/admin/orders?status=&phone=&limit=&offset= - Newest first
pub async fn list_orders(
    State(state): State<AppState>,
    query: Result<Query<OrderFilter>, QueryRejection>,
) -> ApiResult<Vec<Order>> {
    let Query(filter) = query?;
    Ok(ApiResponse::success(state.orders().list_orders(filter).await?))
}

/// GET /api/admin/orders/:id
pub async fn get_order(State(state): State<AppState>, path: Result<Path<Uuid>, PathRejection>) -> ApiResult<Order> {
    let Path(id) = path?;
    Ok(ApiResponse::success(state.orders().get_order(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// PATCH /api/admin/orders/:id/status
///
/// Expected Input: `{ "status": "confirmed" }`. Invalid transitions answer
/// 422; cancelling puts the items back in stock.
pub async fn update_status(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<StatusUpdate>, JsonRejection>,
) -> ApiResult<Order> {
    let Path(id) = path?;
    let Json(update) = payload?;
    Ok(ApiResponse::success(state.orders().update_status(id, update.status).await?))
}
