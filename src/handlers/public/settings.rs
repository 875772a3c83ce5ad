// handlers/public/settings.rs - GET /api/settings

use axum::extract::State;

use crate::database::models::PublicSettings;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/settings - Storefront-visible subset of the site settings
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<PublicSettings> {
    let settings = state.store().get_settings().await?;
    Ok(ApiResponse::success(settings.into()))
}
