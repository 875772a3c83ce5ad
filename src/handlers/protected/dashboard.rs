// handlers/protected/dashboard.rs - GET /api/admin/dashboard

use axum::extract::State;

use crate::database::models::DashboardStats;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/admin/dashboard - Order, revenue, stock and subscriber aggregates
pub async fn get_dashboard(State(state): State<AppState>) -> ApiResult<DashboardStats> {
    let stats = state.store().dashboard_stats(state.config.shop.low_stock_threshold).await?;
    Ok(ApiResponse::success(stats))
}
