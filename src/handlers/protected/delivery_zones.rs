// handlers/protected/delivery_zones.rs - Delivery zone CRUD

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::database::models::{DeliveryZone, DeliveryZoneInput, DeliveryZonePatch};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::delivery;
use crate::state::AppState;

/// GET /api/admin/delivery-zones - All zones, inactive ones included
pub async fn list_zones(State(state): State<AppState>) -> ApiResult<Vec<DeliveryZone>> {
    Ok(ApiResponse::success(state.store().list_zones(false).await?))
}

/// POST /api/admin/delivery-zones
pub async fn create_zone(
    State(state): State<AppState>,
    payload: Result<Json<DeliveryZoneInput>, JsonRejection>,
) -> ApiResult<DeliveryZone> {
    let Json(input) = payload?;
    Ok(ApiResponse::created(delivery::create_zone(state.store(), input).await?))
}

/// PATCH /api/admin/delivery-zones/:id
pub async fn update_zone(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<DeliveryZonePatch>, JsonRejection>,
) -> ApiResult<DeliveryZone> {
    let Path(id) = path?;
    let Json(patch) = payload?;
    Ok(ApiResponse::success(delivery::update_zone(state.store(), id, patch).await?))
}

/// DELETE /api/admin/delivery-zones/:id - Past orders keep the zone name
pub async fn delete_zone(State(state): State<AppState>, path: Result<Path<Uuid>, PathRejection>) -> ApiResult<()> {
    let Path(id) = path?;
    state.store().delete_zone(id).await?;
    Ok(ApiResponse::no_content())
}
