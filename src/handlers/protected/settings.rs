// handlers/protected/settings.rs - Full site settings

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::database::models::{SettingsPatch, SiteSettings};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::settings;
use crate::state::AppState;

/// GET /api/admin/settings
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<SiteSettings> {
    Ok(ApiResponse::success(state.store().get_settings().await?))
}

/// PUT /api/admin/settings - Partial update; `null` clears optional fields
pub async fn update_settings(
    State(state): State<AppState>,
    payload: Result<Json<SettingsPatch>, JsonRejection>,
) -> ApiResult<SiteSettings> {
    let Json(patch) = payload?;
    Ok(ApiResponse::success(settings::update(state.store(), patch).await?))
}
