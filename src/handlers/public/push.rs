// handlers/public/push.rs - Browser push subscriptions

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::database::models::{PushSubscription, PushSubscriptionInput};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::push;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UnsubscribeRequest {
    pub endpoint: String,
}

/// POST /api/push/subscribe - Register a shopper's browser for campaigns
pub async fn subscribe(
    State(state): State<AppState>,
    payload: Result<Json<PushSubscriptionInput>, JsonRejection>,
) -> ApiResult<PushSubscription> {
    let Json(input) = payload?;
    Ok(ApiResponse::created(push::register(state.store(), input, false).await?))
}

/// DELETE /api/push/subscribe - Forget a browser subscription
pub async fn unsubscribe(
    State(state): State<AppState>,
    payload: Result<Json<UnsubscribeRequest>, JsonRejection>,
) -> ApiResult<()> {
    let Json(request) = payload?;
    push::unregister(state.store(), &request.endpoint).await?;
    Ok(ApiResponse::no_content())
}
