use std::sync::Arc;

use anyhow::Context;
use axum::{extract::Request, ServiceExt};
use tracing_subscriber::EnvFilter;

use job_tracker_api::auth::SystemClock;
use job_tracker_api::config::AppConfig;
use job_tracker_api::credentials::FileCredentialStore;
use job_tracker_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up JWT_SECRET, CREDENTIALS_FILE, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env().context("refusing to start")?;
    tracing::info!("Starting Job Tracker API in {:?} mode", config.environment);

    let credentials = FileCredentialStore::new(&config.credentials.file);
    match credentials.load().await {
        Ok(store) => tracing::info!(
            path = %credentials.path().display(),
            subjects = store.len(),
            "credential file loaded"
        ),
        // Not fatal: token issuance answers 503 until the file is readable.
        Err(e) => tracing::warn!(error = %e, "credential file not usable yet"),
    }

    let bind_addr = config.server.bind_address();
    let state = AppState::new(config, Arc::new(credentials), Arc::new(SystemClock));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Job Tracker API listening on http://{}", bind_addr);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app(state)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
