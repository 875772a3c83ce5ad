// handlers/elevated/users.rs - Admin account management

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::{Extension, Json};
use uuid::Uuid;

use crate::database::models::{AdminUser, NewAdminRequest};
use crate::middleware::{ApiResponse, ApiResult, AuthAdmin};
use crate::services::admins;
use crate::state::AppState;

/// GET /api/admin/users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<AdminUser>> {
    Ok(ApiResponse::success(state.store().list_admins().await?))
}

/// POST /api/admin/users
///
/// Expected Input:
/// ```json
/// { "email": "...", "name": "...", "password": "at least 8 chars", "role": "admin" }
/// ```
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<NewAdminRequest>, JsonRejection>,
) -> ApiResult<AdminUser> {
    let Json(request) = payload?;
    Ok(ApiResponse::created(admins::create_admin(state.store(), request).await?))
}

/// DELETE /api/admin/users/:id - Super admins cannot delete themselves
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthAdmin>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = path?;
    admins::delete_admin(state.store(), auth.id, id).await?;
    Ok(ApiResponse::no_content())
}
