// handlers/protected/auth.rs - Session endpoints for a logged-in admin

use axum::extract::State;
use axum::Extension;

use crate::auth::{issue_token, IssuedToken};
use crate::database::models::AdminUser;
use crate::middleware::{ApiResponse, ApiResult, AuthAdmin};
use crate::state::AppState;

/// GET /api/admin/auth/whoami - The admin behind the token
pub async fn whoami(Extension(auth): Extension<AuthAdmin>) -> ApiResult<AdminUser> {
    Ok(ApiResponse::success(auth.admin))
}

/// POST /api/admin/auth/refresh - Fresh token with a new expiry
pub async fn refresh(State(state): State<AppState>, Extension(auth): Extension<AuthAdmin>) -> ApiResult<IssuedToken> {
    let issued = issue_token(&auth.admin, state.jwt_secret(), state.config.security.jwt_expiry_hours)?;
    tracing::debug!(admin = %auth.email, "Token refreshed");
    Ok(ApiResponse::success(issued))
}
