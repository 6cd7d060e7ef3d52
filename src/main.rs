use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use appointment_api::{app, clock::SystemClock, config::AppConfig, database, mail, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, ROLE_SECRET_*, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!("Starting appointment API in {:?} mode", config.environment);

    let store = database::open(&config.database)
        .await
        .context("failed to open document store")?;
    let mailer = mail::from_config(&config.mail).context("failed to configure mail")?;

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let state = AppState::new(config, store, mailer, Arc::new(SystemClock))
        .context("failed to initialise auth")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
