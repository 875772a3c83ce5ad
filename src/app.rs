use axum::http::{header, HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::SecurityConfig;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{require_admin, require_super_admin};
use crate::state::AppState;

/// Full router: public storefront, admin tier and super admin tier.
pub fn app(state: AppState) -> Router {
    let admin = protected_routes().route_layer(from_fn_with_state(state.clone(), require_admin));
    let users = elevated_routes().route_layer(from_fn_with_state(state.clone(), require_super_admin));

    let mut router = Router::new()
        .route("/", get(public::info::root))
        .route("/health", get(public::info::health))
        .merge(public_routes())
        .nest("/api/admin", admin.merge(users))
        .layer(TraceLayer::new_for_http());

    if state.config.security.enable_cors {
        router = router.layer(cors_layer(&state.config.security));
    }
    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    use public::{auth, catalog, delivery, galleries, newsletter, orders, push, settings};

    Router::new()
        // Catalog
        .route("/api/products", get(catalog::list_products))
        .route("/api/products/:slug", get(catalog::get_product))
        .route("/api/categories", get(catalog::list_categories))
        // Delivery
        .route("/api/delivery/zones", get(delivery::list_zones))
        .route("/api/delivery/quote", get(delivery::quote))
        // Orders
        .route("/api/orders", post(orders::create_order))
        .route("/api/orders/track/:number", get(orders::track_order))
        // Content
        .route("/api/settings", get(settings::get_settings))
        .route("/api/galleries/:gallery", get(galleries::get_gallery))
        // Audience
        .route("/api/newsletter/subscribe", post(newsletter::subscribe))
        .route("/api/newsletter/unsubscribe", post(newsletter::unsubscribe))
        .route("/api/push/subscribe", post(push::subscribe).delete(push::unsubscribe))
        // Token acquisition
        .route("/api/auth/login", post(auth::login))
}

fn protected_routes() -> Router<AppState> {
    use protected::{auth, campaigns, dashboard, delivery_zones, galleries, newsletter, orders, products, push, settings};

    Router::new()
        .route("/auth/whoami", get(auth::whoami))
        .route("/auth/refresh", post(auth::refresh))
        .route("/dashboard", get(dashboard::get_dashboard))
        .route("/products", get(products::list_products).post(products::create_product))
        .route(
            "/products/:id",
            get(products::get_product)
                .patch(products::update_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/orders", get(orders::list_orders))
        .route("/orders/:id", get(orders::get_order))
        .route("/orders/:id/status", patch(orders::update_status).put(orders::update_status))
        .route("/delivery-zones", get(delivery_zones::list_zones).post(delivery_zones::create_zone))
        .route(
            "/delivery-zones/:id",
            patch(delivery_zones::update_zone)
                .put(delivery_zones::update_zone)
                .delete(delivery_zones::delete_zone),
        )
        .route("/settings", get(settings::get_settings).put(settings::update_settings))
        .route("/galleries/images/:id", patch(galleries::update_image).delete(galleries::delete_image))
        .route("/galleries/:gallery", get(galleries::list_images).post(galleries::add_image))
        .route("/galleries/:gallery/order", put(galleries::reorder))
        .route("/newsletter/subscribers", get(newsletter::list_subscribers))
        .route("/campaigns", get(campaigns::list_campaigns).post(campaigns::create_campaign))
        .route("/campaigns/:id", get(campaigns::get_campaign))
        .route("/campaigns/:id/send", post(campaigns::send_campaign))
        .route("/push/subscribe", post(push::subscribe))
}

fn elevated_routes() -> Router<AppState> {
    use elevated::users;

    Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/:id", delete(users::delete_user))
}

/// `*` in the origin list allows any origin.
fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if security.cors_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
