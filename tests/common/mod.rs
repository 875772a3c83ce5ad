#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use grandson_api::config::{AppConfig, DemoMode};
use grandson_api::database::models::{NewAdminRequest, Product};
use grandson_api::database::{FallbackStore, MemoryStore, Store};
use grandson_api::services::admins;
use grandson_api::types::AdminRole;
use grandson_api::{app, AppState};

pub const ADMIN_PASSWORD: &str = "kaloum-2026";

/// Router over a fresh demo catalog. Each call gets its own data.
pub struct TestApp {
    pub router: Router,
    pub memory: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let memory = Arc::new(MemoryStore::demo());
        let store = Arc::new(FallbackStore::new(None, memory.clone(), DemoMode::Always));
        let config = AppConfig::development();
        let router = app(AppState::new(store, Arc::new(config)));
        Self { router, memory }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>, token: Option<&str>) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).with_context(|| format!("non-JSON body for {}", uri))?
        };
        Ok((status, json))
    }

    pub async fn get(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, uri, Some(body), None).await
    }

    /// Creates an admin account directly in the store.
    pub async fn create_admin(&self, email: &str, role: AdminRole) -> Result<()> {
        admins::create_admin(
            self.memory.as_ref(),
            NewAdminRequest {
                email: email.to_string(),
                name: "Fatoumata Camara".to_string(),
                password: ADMIN_PASSWORD.to_string(),
                role,
            },
        )
        .await?;
        Ok(())
    }

    pub async fn login(&self, email: &str) -> Result<String> {
        let (status, body) = self
            .post("/api/auth/login", serde_json::json!({ "email": email, "password": ADMIN_PASSWORD }))
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed: {} {}", status, body);
        body["data"]["token"].as_str().map(str::to_string).context("token missing")
    }

    /// Token for a fresh admin with the given role.
    pub async fn admin_token(&self, role: AdminRole) -> Result<String> {
        let email = match role {
            AdminRole::Admin => "admin@grandsonproject.com",
            AdminRole::SuperAdmin => "owner@grandsonproject.com",
        };
        self.create_admin(email, role).await?;
        self.login(email).await
    }

    pub async fn product(&self, slug: &str) -> Result<Product> {
        Ok(self.memory.get_product_by_slug(slug).await?)
    }
}

/// A valid order body for one product line.
pub fn order_body(product: &Product, quantity: i32) -> Value {
    serde_json::json!({
        "customer_name": "Mariama Diallo",
        "customer_phone": "+224 621 00 11 22",
        "customer_email": "mariama@example.gn",
        "delivery_zone": "Kaloum",
        "delivery_address": "Almamya, immeuble Kakimbo",
        "payment_method": "cash_on_delivery",
        "items": [{
            "product_id": product.id,
            "quantity": quantity,
            "size": product.sizes.first(),
            "color": product.colors.first(),
        }]
    })
}

/// The real `grandson-api` binary, started in forced demo mode.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    pub fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let child = Command::new(env!("CARGO_BIN_EXE_grandson-api"))
            .env("GRANDSON_API_PORT", port.to_string())
            .env("HOST", "127.0.0.1")
            .env("GRANDSON_DEMO_MODE", "always")
            .env("APP_ENV", "development")
            .env_remove("DATABASE_URL")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    pub async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        let url = format!("{}/health", self.base_url);
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
