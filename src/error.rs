// HTTP API Error Types
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::auth::AuthError;
use crate::database::StoreError;
use crate::notify::NotifyError;
use crate::types::ContactError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<BTreeMap<String, String>>,
    },
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),
    InsufficientStock(String),

    // 422 Unprocessable Entity
    InvalidTransition(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 502 Bad Gateway (mail relay, push gateway)
    BadGateway(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError { .. } | ApiError::InvalidJson(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) | ApiError::InsufficientStock(_) => StatusCode::CONFLICT,
            ApiError::InvalidTransition(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::InvalidJson(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::InsufficientStock(msg)
            | ApiError::InvalidTransition(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::BadGateway(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InsufficientStock(_) => "INSUFFICIENT_STOCK",
            ApiError::InvalidTransition(_) => "INVALID_STATUS_TRANSITION",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway(_) => "BAD_GATEWAY",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "error": self.message(),
            "code": self.error_code(),
        });
        if let ApiError::ValidationError { field_errors: Some(field_errors), .. } = self {
            body["field_errors"] = json!(field_errors);
        }
        body
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(message: impl Into<String>, field_errors: Option<BTreeMap<String, String>>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    /// Validation failure on a single field.
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        errors.into()
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

/// Field-level validation failures collected before rejecting a request.
#[derive(Debug, Default, Error)]
#[error("Validation failed for {} field(s)", .errors.len())]
pub struct ValidationErrors {
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the first error for a field; later ones for the same field are dropped.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        ApiError::validation_error("Certains champs sont invalides", Some(err.errors))
    }
}

impl From<ContactError> for ApiError {
    fn from(err: ContactError) -> Self {
        let field = match err {
            ContactError::EmptyEmail | ContactError::EmailTooLong { .. } | ContactError::InvalidEmail => "email",
            ContactError::EmptyPhone | ContactError::InvalidPhone => "phone",
        };
        ApiError::field(field, err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ApiError::not_found(not_found_message(&what)),
            StoreError::Conflict(msg) => ApiError::conflict(msg),
            StoreError::InsufficientStock {
                product,
                available,
                requested,
                ..
            } => ApiError::InsufficientStock(insufficient_stock_message(&product, available, requested)),
            StoreError::InvalidTransition { from, to } => ApiError::InvalidTransition(format!(
                "Impossible de passer une commande de « {} » à « {} »",
                from.label(),
                to.label()
            )),
            StoreError::Unavailable(msg) => {
                tracing::error!("Store unavailable: {}", msg);
                ApiError::service_unavailable("Service temporairement indisponible")
            }
            StoreError::Database(msg) => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Database error: {}", msg);
                ApiError::internal_server_error("Une erreur est survenue, veuillez réessayer")
            }
        }
    }
}

fn not_found_message(what: &str) -> String {
    let label = match what {
        "Product" => "Produit introuvable",
        "Order" => "Commande introuvable",
        "Delivery zone" => "Zone de livraison introuvable",
        "Gallery image" => "Image introuvable",
        "Campaign" => "Campagne introuvable",
        "Admin" => "Administrateur introuvable",
        _ => "Élément introuvable",
    };
    label.to_string()
}

/// French stock message shown to shoppers.
pub fn insufficient_stock_message(product: &str, available: i32, requested: i32) -> String {
    match available {
        0 => format!("« {} » est en rupture de stock", product),
        1 => format!("Il ne reste qu'un exemplaire de « {} » ({} demandés)", product, requested),
        n => format!("Il ne reste que {} exemplaires de « {} » ({} demandés)", n, product, requested),
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::unauthorized("E-mail ou mot de passe incorrect"),
            AuthError::MissingToken => ApiError::unauthorized("Connexion requise"),
            AuthError::InvalidToken => ApiError::unauthorized("Session invalide"),
            AuthError::TokenExpired => ApiError::unauthorized("Session expirée, reconnectez-vous"),
            AuthError::Forbidden => ApiError::forbidden("Droits insuffisants"),
            AuthError::Hashing(msg) | AuthError::Encoding(msg) => {
                tracing::error!("Authentication internals failed: {}", msg);
                ApiError::internal_server_error("Échec de l'authentification")
            }
        }
    }
}

impl From<NotifyError> for ApiError {
    fn from(err: NotifyError) -> Self {
        tracing::error!("Notification error: {}", err);
        match err {
            NotifyError::Template(_) => ApiError::internal_server_error("Impossible de préparer la notification"),
            _ => ApiError::BadGateway("Le service de notification ne répond pas".to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidJson(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Rejected path parameters: {}", rejection.body_text());
        ApiError::bad_request("Identifiant invalide dans l'adresse")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
