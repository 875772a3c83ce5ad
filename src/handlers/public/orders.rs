// handlers/public/orders.rs - Checkout and order tracking

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::database::models::{NewOrderRequest, Order};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /api/orders - Place an order
///
/// Prices come from the catalogue, never from the request. Answers 201 with
/// the stored order, including its `order_number` for tracking.
pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<NewOrderRequest>, JsonRejection>,
) -> ApiResult<Order> {
    let Json(request) = payload?;
    let order = state.orders().place_order(request).await?;
    Ok(ApiResponse::created(order))
}

#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    #[serde(default)]
    pub phone: String,
}

/// GET /api/orders/track/:number?phone= - Order status for the customer
pub async fn track_order(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<TrackQuery>, QueryRejection>,
) -> ApiResult<Order> {
    let Path(number) = path?;
    let Query(query) = query?;
    let order = state.orders().track_order(&number, &query.phone).await?;
    Ok(ApiResponse::success(order))
}
