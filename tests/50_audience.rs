mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use common::TestApp;
use grandson_api::config::AppConfig;
use grandson_api::services::newsletter::unsubscribe_token;
use grandson_api::types::AdminRole;
use serde_json::json;

#[tokio::test]
async fn newsletter_subscription_is_idempotent() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.post("/api/newsletter/subscribe", json!({ "email": " Kadiatou@Example.GN " })).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["email"], "kadiatou@example.gn");
    assert_eq!(body["data"]["created"], true);

    let (status, body) = app.post("/api/newsletter/subscribe", json!({ "email": "kadiatou@example.gn" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["created"], false);

    let (status, _) = app.post("/api/newsletter/subscribe", json!({ "email": "pas-un-email" })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn unsubscribe_needs_the_signed_token() -> Result<()> {
    let app = TestApp::new();
    app.post("/api/newsletter/subscribe", json!({ "email": "ibrahima@example.gn" })).await?;

    let (status, _) = app
        .post("/api/newsletter/unsubscribe", json!({ "email": "ibrahima@example.gn", "token": "forged" }))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let secret = AppConfig::development().security.jwt_secret;
    let token = unsubscribe_token(&secret, "ibrahima@example.gn");
    let (status, _) = app
        .post("/api/newsletter/unsubscribe", json!({ "email": "ibrahima@example.gn", "token": token }))
        .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let admin = app.admin_token(AdminRole::Admin).await?;
    let (_, body) = app
        .request(Method::GET, "/api/admin/newsletter/subscribers", None, Some(&admin))
        .await?;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
    Ok(())
}

#[tokio::test]
async fn email_campaign_reaches_subscribers_once() -> Result<()> {
    let app = TestApp::new();
    for email in ["awa@example.gn", "sekou@example.gn"] {
        app.post("/api/newsletter/subscribe", json!({ "email": email })).await?;
    }
    let admin = app.admin_token(AdminRole::Admin).await?;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/admin/campaigns",
            Some(json!({
                "channel": "email",
                "title": "Nouvelle collection",
                "body": "La collection Conakry est en ligne.",
                "url": "https://grandsonproject.com/collection"
            })),
            Some(&admin),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["data"]["status"], "draft");
    let id = body["data"]["id"].as_str().expect("id").to_string();

    let send_uri = format!("/api/admin/campaigns/{}/send", id);
    let (status, body) = app.request(Method::POST, &send_uri, None, Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["status"], "sent");
    assert_eq!(body["data"]["recipients"], 2);
    assert_eq!(body["data"]["delivered"], 2);

    let (status, _) = app.request(Method::POST, &send_uri, None, Some(&admin)).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn push_subscription_round_trip() -> Result<()> {
    let app = TestApp::new();
    let subscription = json!({
        "endpoint": "https://push.example.com/send/abc123",
        "keys": { "p256dh": "BNc0ZpYkey", "auth": "tBHItJI5" }
    });

    let (status, _) = app.post("/api/push/subscribe", subscription).await?;
    assert_eq!(status, StatusCode::CREATED);

    let remove = json!({ "endpoint": "https://push.example.com/send/abc123" });
    let (status, _) = app
        .request(Method::DELETE, "/api/push/subscribe", Some(remove.clone()), None)
        .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.request(Method::DELETE, "/api/push/subscribe", Some(remove), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn plain_http_push_endpoint_is_rejected() -> Result<()> {
    let app = TestApp::new();
    let (status, _) = app
        .post(
            "/api/push/subscribe",
            json!({ "endpoint": "http://push.example.com/x", "keys": { "p256dh": "k", "auth": "a" } }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}
