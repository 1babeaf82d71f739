//! Fixed-window rate limiting keyed by the client's source address.
//!
//! One counter per address is shared by every route. Once an address has made
//! `max_requests` within the current window, further requests are rejected
//! with 429 until the window rolls over.

use std::{
    collections::HashMap,
    convert::Infallible,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::ConnectInfo,
    http::{header, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::future::BoxFuture;
use tokio::sync::Mutex;
use tower::{Layer, Service};
use tracing::warn;

use crate::transport::http::types::MessageResponse;

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests from this IP, please try again later.";

/// Counters are pruned of expired windows once the map grows past this size.
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_requests: u64,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
        }
    }
}

#[derive(Clone)]
pub struct RateLimitLayer {
    state: Arc<RateLimitState>,
}

pub fn rate_limit_layer(config: RateLimitConfig) -> RateLimitLayer {
    RateLimitLayer {
        state: Arc::new(RateLimitState::new(config)),
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitService {
            inner,
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RateLimitService<S> {
    inner: S,
    state: Arc<RateLimitState>,
}

impl<S, ReqBody> Service<Request<ReqBody>> for RateLimitService<S>
where
    S: Service<Request<ReqBody>, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let mut inner = self.inner.clone();
        let state = self.state.clone();

        Box::pin(async move {
            let client = client_key(&request);
            match state.check(&client).await {
                Ok(()) => inner.call(request).await,
                Err(rejection) => Ok(rejection.into_response()),
            }
        })
    }
}

#[derive(Debug)]
struct RateLimitState {
    config: RateLimitConfig,
    counters: Mutex<HashMap<String, Counter>>,
}

#[derive(Clone, Debug)]
struct Counter {
    window_start: Instant,
    count: u64,
}

impl RateLimitState {
    fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            counters: Mutex::new(HashMap::new()),
        }
    }

    async fn check(&self, client: &str) -> Result<(), RateLimitRejection> {
        let window = self.config.window;
        let now = Instant::now();
        let mut counters = self.counters.lock().await;

        if counters.len() > PRUNE_THRESHOLD {
            counters.retain(|_, c| now.saturating_duration_since(c.window_start) < window);
        }

        let entry = counters.entry(client.to_string()).or_insert_with(|| Counter {
            window_start: now,
            count: 0,
        });

        let elapsed = now.saturating_duration_since(entry.window_start);
        if elapsed >= window {
            entry.window_start = now;
            entry.count = 0;
        }

        if entry.count >= self.config.max_requests {
            let retry_after = window
                .checked_sub(elapsed)
                .unwrap_or_default()
                .max(Duration::from_secs(1));
            warn!(
                client,
                limit = self.config.max_requests,
                "rate limit exceeded"
            );
            return Err(RateLimitRejection { retry_after });
        }

        entry.count += 1;
        Ok(())
    }
}

#[derive(Debug)]
struct RateLimitRejection {
    retry_after: Duration,
}

impl IntoResponse for RateLimitRejection {
    fn into_response(self) -> Response {
        let retry_after_secs = self.retry_after.as_secs().max(1);
        let body = MessageResponse::new(RATE_LIMIT_MESSAGE);
        let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
        response.headers_mut().insert(
            header::RETRY_AFTER,
            HeaderValue::from_str(&retry_after_secs.to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("1")),
        );
        response
    }
}

/// The peer IP as seen by the listener. Requests served without connect info
/// (in-process tests) share a single bucket.
fn client_key<B>(request: &Request<B>) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_after_limit_per_client() {
        let state = RateLimitState::new(RateLimitConfig {
            max_requests: 2,
            window: Duration::from_secs(60),
        });

        state.check("10.0.0.1").await.unwrap();
        state.check("10.0.0.1").await.unwrap();
        let err = state.check("10.0.0.1").await.unwrap_err();
        assert!(err.retry_after <= Duration::from_secs(60));

        // Other clients have their own window.
        state.check("10.0.0.2").await.unwrap();
    }

    #[tokio::test]
    async fn window_rollover_resets_count() {
        let state = RateLimitState::new(RateLimitConfig {
            max_requests: 1,
            window: Duration::from_millis(50),
        });

        state.check("a").await.unwrap();
        assert!(state.check("a").await.is_err());
        tokio::time::sleep(Duration::from_millis(80)).await;
        state.check("a").await.unwrap();
    }

    #[test]
    fn client_key_uses_peer_ip() {
        let mut request = Request::builder().uri("/products").body(()).unwrap();
        assert_eq!(client_key(&request), "unknown");

        let addr: SocketAddr = "192.168.1.7:5555".parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));
        assert_eq!(client_key(&request), "192.168.1.7");
    }

    #[test]
    fn rejection_carries_fixed_message_and_retry_after() {
        let response = RateLimitRejection {
            retry_after: Duration::from_secs(30),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "30");
    }
}
