// handlers/public/delivery.rs - Delivery zones and fee quotes

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde::Deserialize;

use crate::database::models::DeliveryZone;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::delivery;
use crate::services::DeliveryQuote;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    /// Zone id or name
    pub zone: String,
    #[serde(default)]
    pub subtotal: i64,
}

/// GET /api/delivery/zones - Zones open for delivery
pub async fn list_zones(State(state): State<AppState>) -> ApiResult<Vec<DeliveryZone>> {
    Ok(ApiResponse::success(state.store().list_zones(true).await?))
}

/// GET /api/delivery/quote?zone=&subtotal= - Delivery fee for a cart subtotal
pub async fn quote(
    State(state): State<AppState>,
    query: Result<Query<QuoteQuery>, QueryRejection>,
) -> ApiResult<DeliveryQuote> {
    let Query(query) = query?;
    let quote = delivery::quote_for(state.store(), &query.zone, query.subtotal).await?;
    Ok(ApiResponse::success(quote))
}
