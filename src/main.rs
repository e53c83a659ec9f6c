//! Presigned Uploads Server
//!
//! Signs S3 upload URLs so browsers and other clients can send files
//! straight to the bucket.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use presign_uploads::config::Config;
use presign_uploads::routes;
use presign_uploads::state::AppState;
use presign_uploads::storage::S3Storage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "presign_uploads=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!("Starting Presigned Uploads Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("S3 bucket: {} ({})", config.storage.bucket, config.storage.region);
    if let Some(endpoint) = &config.storage.endpoint {
        tracing::info!("S3 endpoint: {}", endpoint);
    }

    // Initialize S3 client
    let storage = S3Storage::new(&config.storage)
        .await
        .context("Failed to initialize S3 client")?;

    let app_state = AppState::new(config.presign, Arc::new(storage));
    let app = routes::router(app_state);

    // Start server with graceful shutdown
    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Server is listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
