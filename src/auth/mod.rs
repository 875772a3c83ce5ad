use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::AdminUser;
use crate::database::{Store, StoreError};
use crate::types::AdminRole;

/// Minimum admin password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Well-formed Argon2id hash with the default cost that no password matches.
/// Verified against when the email is unknown so both failures take as long.
const UNKNOWN_ADMIN_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$Z3JhbmRzb24tbG9naW4tcw$TOCTLWnefFKBy57RFFteLy+DzLWKgqNvUqqM72z27Us";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Missing bearer token")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Insufficient privileges")]
    Forbidden,
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

/// JWT claims carried by admin tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Admin id.
    pub sub: Uuid,
    pub email: String,
    pub role: AdminRole,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(admin: &AdminUser, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: admin.id,
            email: admin.email.clone(),
            role: admin.role,
            iat: now.timestamp(),
            exp,
        }
    }
}

/// Signed token plus its lifetime in seconds.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

pub fn issue_token(admin: &AdminUser, secret: &str, expiry_hours: u64) -> Result<IssuedToken, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::Encoding("JWT secret not configured".to_string()));
    }
    let claims = Claims::new(admin, expiry_hours);
    let expires_in = claims.exp - claims.iat;
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Encoding(e.to_string()))?;
    Ok(IssuedToken { token, expires_in })
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
}

/// Hash a password using Argon2id.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verify a password against a stored hash. Malformed hashes count as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub admin: AdminUser,
}

/// Checks credentials and issues a token. Unknown emails and wrong
/// passwords fail identically.
pub async fn login(
    store: &dyn Store,
    request: &LoginRequest,
    secret: &str,
    expiry_hours: u64,
) -> Result<LoginResponse, crate::error::ApiError> {
    let admin = match store.get_admin_by_email(request.email.trim()).await {
        Ok(admin) => admin,
        Err(StoreError::NotFound(_)) => {
            verify_password(&request.password, UNKNOWN_ADMIN_HASH);
            return Err(AuthError::InvalidCredentials.into());
        }
        Err(err) => return Err(err.into()),
    };
    if !verify_password(&request.password, &admin.password_hash) {
        tracing::warn!(email = %admin.email, "Failed admin login");
        return Err(AuthError::InvalidCredentials.into());
    }

    if let Err(err) = store.touch_admin_login(admin.id).await {
        tracing::warn!(error = %err, "Could not record admin login time");
    }
    let issued = issue_token(&admin, secret, expiry_hours)?;
    tracing::info!(admin = %admin.email, "Admin logged in");
    Ok(LoginResponse {
        token: issued.token,
        expires_in: issued.expires_in,
        admin,
    })
}
