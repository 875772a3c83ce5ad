use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use grandson_api::config;
use grandson_api::database::{DatabaseManager, Store};
use grandson_api::{app, is_development, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("grandson_api=info,tower_http=info")),
        )
        .init();

    let config = config::config();
    config.validate().context("invalid configuration")?;
    tracing::info!("Starting Grandson Project API in {:?} mode", config.environment);
    if is_development!() {
        tracing::debug!(
            demo_mode = ?config.store.demo_mode,
            database = config.database.url.is_some(),
            email = config.email.is_some(),
            push = config.push.is_some(),
            "Effective configuration"
        );
    }

    let store = DatabaseManager::build_store(config).await.context("store setup failed")?;
    tracing::info!(mode = ?store.mode(), source = ?store.source(), "Store ready");

    let state = AppState::new(store, Arc::new(config.clone()));
    let router = app(state);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Grandson Project API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
