use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{verify_token, AuthError};
use crate::database::models::AdminUser;
use crate::database::StoreError;
use crate::error::ApiError;
use crate::state::AppState;
use crate::types::AdminRole;

/// Authenticated admin injected into protected requests
#[derive(Clone, Debug)]
pub struct AuthAdmin {
    pub id: Uuid,
    pub email: String,
    pub role: AdminRole,
    pub admin: AdminUser,
}

impl From<AdminUser> for AuthAdmin {
    fn from(admin: AdminUser) -> Self {
        Self {
            id: admin.id,
            email: admin.email.clone(),
            role: admin.role,
            admin,
        }
    }
}

/// Validates the Bearer token and loads the admin it names.
pub async fn require_admin(State(state): State<AppState>, mut request: Request, next: Next) -> Result<Response, ApiError> {
    let admin = authenticate(&state, request.headers()).await?;
    request.extensions_mut().insert(admin);
    Ok(next.run(request).await)
}

/// Same as [`require_admin`] but only lets super admins through.
pub async fn require_super_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let admin = authenticate(&state, request.headers()).await?;
    if admin.role != AdminRole::SuperAdmin {
        tracing::warn!(admin = %admin.email, "Super admin route refused");
        return Err(AuthError::Forbidden.into());
    }
    request.extensions_mut().insert(admin);
    Ok(next.run(request).await)
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthAdmin, ApiError> {
    let token = extract_bearer(headers)?;
    let claims = verify_token(token, state.jwt_secret())?;

    // Deleted admins lose access even with an unexpired token.
    let admin = match state.store().get_admin(claims.sub).await {
        Ok(admin) => admin,
        Err(StoreError::NotFound(_)) => return Err(AuthError::InvalidToken.into()),
        Err(err) => return Err(err.into()),
    };
    Ok(AuthAdmin::from(admin))
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    match value.strip_prefix("Bearer ").map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::MissingToken),
    }
}
