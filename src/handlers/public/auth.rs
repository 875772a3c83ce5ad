// handlers/public/auth.rs - POST /api/auth/login

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::auth::{self, LoginRequest, LoginResponse};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /api/auth/login - Exchange admin credentials for a JWT
///
/// Expected Input:
/// ```json
/// { "email": "admin@grandsonproject.com", "password": "..." }
/// ```
///
/// Unknown emails and wrong passwords both answer 401 with the same body.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let Json(request) = payload?;
    let security = &state.config.security;
    let response = auth::login(state.store(), &request, &security.jwt_secret, security.jwt_expiry_hours).await?;
    Ok(ApiResponse::success(response))
}
