//! sync-server — external commerce synchronization engine
//!
//! Long-running service that:
//! - Imports orders from external commerce platforms (pull + webhook)
//! - Exports inventory levels per product mapping
//! - Propagates order status changes, one authorized platform per channel
//! - Keeps a bounded-retry audit trail of every outbound push

mod api;
mod auth;
mod config;
mod db;
mod error;
mod platform;
mod state;
mod sync;

use tokio_util::sync::CancellationToken;

use config::Config;
use state::AppState;
use sync::worker::WebhookWorker;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sync_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting sync-server (env: {})", config.environment);

    // Initialize application state (pool + migrations)
    let state = AppState::new(&config).await?;

    // Background webhook queue drain
    let shutdown = CancellationToken::new();
    let worker = WebhookWorker::new(
        state.clone(),
        shutdown.clone(),
        config.webhook_drain_interval_secs,
    );
    let worker_handle = tokio::spawn(worker.run());

    // HTTP server
    let app = api::create_router(state);
    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("sync-server HTTP listening on {addr}");

    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
            server_shutdown.cancel();
        })
        .await?;

    shutdown.cancel();
    worker_handle.await?;

    Ok(())
}
