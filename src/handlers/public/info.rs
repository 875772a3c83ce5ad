// handlers/public/info.rs - GET / and GET /health

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::config::DemoMode;
use crate::database::Store;
use crate::state::AppState;

/// GET / - API name, version and route overview
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Grandson Project API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Storefront and admin backend for the Grandson Project shop",
            "endpoints": {
                "catalog": "/api/products[/:slug], /api/categories",
                "delivery": "/api/delivery/zones, /api/delivery/quote",
                "orders": "/api/orders, /api/orders/track/:number",
                "content": "/api/settings, /api/galleries/:gallery",
                "newsletter": "/api/newsletter/subscribe, /api/newsletter/unsubscribe",
                "push": "/api/push/subscribe",
                "auth": "/api/auth/login",
                "admin": "/api/admin/* (admin token)",
                "users": "/api/admin/users (super admin token)",
            }
        }
    }))
}

/// GET /health - store mode and whether demo data is being served
///
/// Answers 503 only when nothing can be served: the database is down and
/// demo fallback is disabled.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let mode = state.store.mode();
    let check = state.store.health_check().await;
    let degraded = state.store.is_degraded();

    let data = json!({
        "status": if check.is_err() { "down" } else if degraded { "degraded" } else { "ok" },
        "timestamp": now,
        "store_mode": mode,
        "degraded": degraded,
        "source": state.store.source(),
    });

    match check {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true, "data": data }))),
        Err(err) => {
            tracing::error!(error = %err, "Health check failed");
            let status = if mode == DemoMode::Never {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::OK
            };
            (
                status,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": data,
                })),
            )
        }
    }
}
