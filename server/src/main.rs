//! `RoomQuest` Server - Main Entry Point

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use rq_server::{api, config, db, storage};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rq_server=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting RoomQuest Server"
    );

    // Initialize database
    let db_pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&db_pool).await?;
    let repo = Arc::new(db::PgRepository::new(db_pool));

    // Initialize object storage; uploads fail per request if the bucket is unreachable
    let images = storage::S3ImageStore::new(&config);
    match images.health_check().await {
        Ok(()) => info!(bucket = %config.s3_bucket, "S3 storage connected"),
        Err(e) => tracing::warn!("S3 health check failed: {}. Uploads will fail until it recovers.", e),
    }

    let fetcher =
        storage::HttpImageFetcher::new(config.remote_fetch_timeout(), config.max_upload_size);

    // Build application state
    let state = api::AppState::new(
        repo.clone(),
        Arc::new(images),
        Arc::new(fetcher),
        config.clone(),
    );

    // Build router
    let app = api::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;
    info!(address = %config.bind_address, "Server listening");

    // Graceful shutdown handler
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    repo.close().await;
    info!("Server shutdown complete");

    Ok(())
}
