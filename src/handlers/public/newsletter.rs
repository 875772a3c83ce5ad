// handlers/public/newsletter.rs - Newsletter opt-in and opt-out

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::database::models::{SubscribeRequest, SubscriberSource, UnsubscribeRequest};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::newsletter;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub email: String,
    /// False when the address was already subscribed.
    pub created: bool,
}

/// POST /api/newsletter/subscribe - 201 for new addresses, 200 otherwise
pub async fn subscribe(
    State(state): State<AppState>,
    payload: Result<Json<SubscribeRequest>, JsonRejection>,
) -> ApiResult<SubscribeResponse> {
    let Json(request) = payload?;
    let created = newsletter::subscribe(state.store(), &request.email, SubscriberSource::Footer).await?;
    let body = SubscribeResponse {
        email: request.email.trim().to_lowercase(),
        created,
    };
    Ok(if created {
        ApiResponse::created(body)
    } else {
        ApiResponse::success(body)
    })
}

/// POST /api/newsletter/unsubscribe - Requires the token from the email link
pub async fn unsubscribe(
    State(state): State<AppState>,
    payload: Result<Json<UnsubscribeRequest>, JsonRejection>,
) -> ApiResult<()> {
    let Json(request) = payload?;
    newsletter::unsubscribe(state.store(), state.jwt_secret(), &request).await?;
    Ok(ApiResponse::no_content())
}
