// src/bin/api_server.rs

use anyhow::Context;
use catalog_backend::infra::telemetry;
use catalog_backend::transport::http::{build_app, AppState};
use catalog_backend::{storage, AppConfig, MemoryObjectStorage, ObjectStorage, S3ObjectStorage};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    telemetry::init()?;

    // --- Record Store Initialization ---
    let store = storage::connect(&config.storage)
        .await
        .context("failed to initialise record store")?;

    // --- Object Storage Initialization ---
    let object_storage: Arc<dyn ObjectStorage> = match config.object_storage.bucket.clone() {
        Some(bucket) => {
            info!(%bucket, region = %config.object_storage.region, "uploads go to S3");
            Arc::new(S3ObjectStorage::from_config(&config.object_storage, bucket).await)
        }
        None => {
            warn!("AWS_BUCKET_NAME is not set; uploads are kept in memory only");
            Arc::new(MemoryObjectStorage::new())
        }
    };

    let app_state = AppState {
        store,
        object_storage,
    };

    // --- API Server Initialization ---
    let app = build_app(app_state, config.rate_limit.clone());
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        %addr,
        limit = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window.as_secs(),
        "API server listening"
    );
    info!("Swagger UI available at http://localhost:{}/swagger-ui", config.port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("graceful shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
