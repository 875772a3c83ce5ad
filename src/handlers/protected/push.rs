// handlers/protected/push.rs - POST /api/admin/push/subscribe

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};

use crate::database::models::{PushSubscription, PushSubscriptionInput};
use crate::middleware::{ApiResponse, ApiResult, AuthAdmin};
use crate::services::push;
use crate::state::AppState;

/// POST /api/admin/push/subscribe - Register this device for new-order alerts
pub async fn subscribe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAdmin>,
    payload: Result<Json<PushSubscriptionInput>, JsonRejection>,
) -> ApiResult<PushSubscription> {
    let Json(input) = payload?;
    let saved = push::register(state.store(), input, true).await?;
    tracing::info!(admin = %auth.email, "Admin device registered for order alerts");
    Ok(ApiResponse::created(saved))
}
