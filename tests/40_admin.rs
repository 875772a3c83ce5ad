mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use common::{order_body, TestApp, ADMIN_PASSWORD};
use grandson_api::types::AdminRole;
use serde_json::json;

#[tokio::test]
async fn admin_routes_require_a_token() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app.get("/api/admin/dashboard").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .request(Method::GET, "/api/admin/dashboard", None, Some("not-a-jwt"))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn login_rejects_wrong_password() -> Result<()> {
    let app = TestApp::new();
    app.create_admin("admin@grandsonproject.com", AdminRole::Admin).await?;

    let (status, wrong) = app
        .post("/api/auth/login", json!({ "email": "admin@grandsonproject.com", "password": "mauvais-mot" }))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, unknown) = app
        .post("/api/auth/login", json!({ "email": "personne@grandsonproject.com", "password": ADMIN_PASSWORD }))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong["error"], unknown["error"]);
    Ok(())
}

#[tokio::test]
async fn whoami_returns_the_admin() -> Result<()> {
    let app = TestApp::new();
    let token = app.admin_token(AdminRole::Admin).await?;

    let (status, body) = app.request(Method::GET, "/api/admin/auth/whoami", None, Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "admin@grandsonproject.com");
    assert!(body["data"].get("password_hash").is_none());
    Ok(())
}

#[tokio::test]
async fn product_lifecycle() -> Result<()> {
    let app = TestApp::new();
    let token = app.admin_token(AdminRole::Admin).await?;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/admin/products",
            Some(json!({
                "name": "Chemise Wax Grandson",
                "price": 250000,
                "category": "chemises",
                "sizes": ["M", "L"],
                "stock": 10,
                "images": ["https://images.grandsonproject.com/products/chemise.jpg"]
            })),
            Some(&token),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["slug"], "chemise-wax-grandson");
    let id = body["data"]["id"].as_str().expect("id").to_string();

    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/api/admin/products/{}", id),
            Some(json!({ "price": 230000, "is_active": false })),
            Some(&token),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["price"], 230_000);

    // Hidden from the storefront once inactive.
    let (status, _) = app.get("/api/products/chemise-wax-grandson").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .request(Method::DELETE, &format!("/api/admin/products/{}", id), None, Some(&token))
        .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());
    Ok(())
}

#[tokio::test]
async fn invalid_product_is_rejected_with_fields() -> Result<()> {
    let app = TestApp::new();
    let token = app.admin_token(AdminRole::Admin).await?;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/admin/products",
            Some(json!({ "name": "Sans prix", "price": 0, "category": "" })),
            Some(&token),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["price"].is_string());
    assert!(body["field_errors"]["category"].is_string());
    Ok(())
}

#[tokio::test]
async fn order_status_follows_transitions() -> Result<()> {
    let app = TestApp::new();
    let token = app.admin_token(AdminRole::Admin).await?;
    let tee = app.product("t-shirt-grandson-classique").await?;
    let (_, created) = app.post("/api/orders", order_body(&tee, 1)).await?;
    let id = created["data"]["id"].as_str().expect("id").to_string();

    let status_uri = format!("/api/admin/orders/{}/status", id);
    let (status, body) = app
        .request(Method::PATCH, &status_uri, Some(json!({ "status": "confirmed" })), Some(&token))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "confirmed");

    let (status, _) = app
        .request(Method::PATCH, &status_uri, Some(json!({ "status": "pending" })), Some(&token))
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = app.request(Method::GET, "/api/admin/orders", None, Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn dashboard_counts_orders() -> Result<()> {
    let app = TestApp::new();
    let token = app.admin_token(AdminRole::Admin).await?;
    let tee = app.product("t-shirt-grandson-classique").await?;
    app.post("/api/orders", order_body(&tee, 1)).await?;

    let (status, body) = app.request(Method::GET, "/api/admin/dashboard", None, Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["orders_total"], 1);
    assert_eq!(body["data"]["revenue"], 170_000);
    Ok(())
}

#[tokio::test]
async fn user_management_is_super_admin_only() -> Result<()> {
    let app = TestApp::new();
    let admin = app.admin_token(AdminRole::Admin).await?;
    let (status, _) = app.request(Method::GET, "/api/admin/users", None, Some(&admin)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let owner = app.admin_token(AdminRole::SuperAdmin).await?;
    let (status, body) = app
        .request(
            Method::POST,
            "/api/admin/users",
            Some(json!({ "email": "boutique@grandsonproject.com", "name": "Boutique", "password": "madina-2026" })),
            Some(&owner),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["role"], "admin");

    let (_, me) = app.request(Method::GET, "/api/admin/auth/whoami", None, Some(&owner)).await?;
    let my_id = me["data"]["id"].as_str().expect("id").to_string();
    let (status, _) = app
        .request(Method::DELETE, &format!("/api/admin/users/{}", my_id), None, Some(&owner))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn malformed_ids_answer_the_json_envelope() -> Result<()> {
    let app = TestApp::new();
    let token = app.admin_token(AdminRole::Admin).await?;

    for uri in ["/api/admin/products/pas-un-uuid", "/api/admin/orders/42"] {
        let (status, body) = app.request(Method::GET, uri, None, Some(&token)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    let owner = app.admin_token(AdminRole::SuperAdmin).await?;
    let (status, body) = app
        .request(Method::DELETE, "/api/admin/users/abc", None, Some(&owner))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    Ok(())
}
