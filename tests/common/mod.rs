//! Shared harness: serves the full app on an ephemeral port.

#![allow(dead_code)]

use catalog_backend::transport::http::{build_app, AppState, RateLimitConfig};
use catalog_backend::{JsonFileStore, MemoryObjectStorage};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub struct TestServer {
    pub base_url: String,
    pub uploads: Arc<MemoryObjectStorage>,
    pub data_file: std::path::PathBuf,
    _dir: TempDir,
}

pub async fn spawn_app() -> TestServer {
    spawn_app_with_limit(RateLimitConfig::default()).await
}

pub async fn spawn_app_with_limit(rate_limit: RateLimitConfig) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let data_file = dir.path().join("db.json");
    let store = Arc::new(JsonFileStore::open(&data_file).await.unwrap());
    let uploads = Arc::new(MemoryObjectStorage::new());

    let app_state = AppState {
        store,
        object_storage: uploads.clone(),
    };
    let base_url = serve(app_state, rate_limit).await;

    TestServer {
        base_url,
        uploads,
        data_file,
        _dir: dir,
    }
}

/// Serves an arbitrary state and returns its base URL.
pub async fn serve(app_state: AppState, rate_limit: RateLimitConfig) -> String {
    let app = build_app(app_state, rate_limit);

    // Bind to an ephemeral port to avoid conflicts with a running server.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

pub fn tight_limit(max_requests: u64) -> RateLimitConfig {
    RateLimitConfig {
        max_requests,
        window: Duration::from_secs(15 * 60),
    }
}
