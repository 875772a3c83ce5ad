// handlers/protected/campaigns.rs - Marketing campaigns

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::database::models::{Campaign, CampaignInput};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::campaigns;
use crate::state::AppState;

/// GET /api/admin/campaigns - Newest first
pub async fn list_campaigns(State(state): State<AppState>) -> ApiResult<Vec<Campaign>> {
    Ok(ApiResponse::success(state.store().list_campaigns().await?))
}

/// POST /api/admin/campaigns - Creates a draft
pub async fn create_campaign(
    State(state): State<AppState>,
    payload: Result<Json<CampaignInput>, JsonRejection>,
) -> ApiResult<Campaign> {
    let Json(input) = payload?;
    Ok(ApiResponse::created(campaigns::create_campaign(state.store(), input).await?))
}

/// GET /api/admin/campaigns/:id
pub async fn get_campaign(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Campaign> {
    let Path(id) = path?;
    Ok(ApiResponse::success(state.store().get_campaign(id).await?))
}

/// POST /api/admin/campaigns/:id/send
///
/// Delivers synchronously and answers with the recorded counters. A
/// campaign that already left the draft state answers 409.
pub async fn send_campaign(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Campaign> {
    let Path(id) = path?;
    let sent = campaigns::send_campaign(state.store(), &state.notifier, state.jwt_secret(), id).await?;
    Ok(ApiResponse::success(sent))
}
