// handlers/protected/newsletter.rs - GET /api/admin/newsletter/subscribers

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde::Deserialize;

use crate::database::models::NewsletterSubscriber;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubscriberQuery {
    #[serde(default = "default_active_only")]
    pub active_only: bool,
}

fn default_active_only() -> bool {
    true
}

/// GET /api/admin/newsletter/subscribers?active_only=
pub async fn list_subscribers(
    State(state): State<AppState>,
    query: Result<Query<SubscriberQuery>, QueryRejection>,
) -> ApiResult<Vec<NewsletterSubscriber>> {
    let Query(query) = query?;
    Ok(ApiResponse::success(state.store().list_subscribers(query.active_only).await?))
}
