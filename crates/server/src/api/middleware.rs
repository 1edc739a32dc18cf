//! Authentication, concurrency, and rate middleware for API routes.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio::time::timeout;

use crate::state::AppState;

const TOKEN_PREFIX: &str = "Token ";

/// Validates the `Authorization: Token <opaque>` header against the token
/// service. 401 on anything else.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let header = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let Some(token) = header.strip_prefix(TOKEN_PREFIX) else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    let token = token.trim();
    if token.is_empty() || state.tokens().validate_token(token).is_err() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(request).await)
}

/// Rejects requests beyond a fixed concurrency cap with 503.
pub async fn concurrency_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    match state.search_limiter().try_acquire() {
        Some(_permit) => Ok(next.run(request).await),
        None => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}

/// Makes requests wait for a rate token, failing with 504 once the wait
/// budget is spent.
pub async fn rate_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    if !state.isearch_limiter().acquire().await {
        return Err(StatusCode::GATEWAY_TIMEOUT);
    }
    Ok(next.run(request).await)
}

/// Fixed-size semaphore; overflow is rejected immediately.
#[derive(Clone)]
pub struct ConcurrencyLimiter {
    sem: Arc<Semaphore>,
}

impl ConcurrencyLimiter {
    pub fn new(limit: usize) -> Self {
        Self {
            sem: Arc::new(Semaphore::new(limit.max(1))),
        }
    }

    pub fn try_acquire(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.sem).try_acquire_owned().ok()
    }
}

/// Token bucket of capacity one, refilled at `rps` tokens per second.
///
/// Requests queue for a token up to the wait budget; the background refill
/// task drops tokens the bucket cannot hold.
pub struct RateLimiter {
    rx: tokio::sync::Mutex<mpsc::Receiver<()>>,
    wait: Duration,
}

impl RateLimiter {
    pub fn new(rps: u32, wait: Duration) -> Self {
        let rps = rps.max(1);
        let (tx, rx) = mpsc::channel(1);

        let interval = Duration::from_secs(1) / rps;
        tokio::spawn(async move {
            // The first tick fires immediately and seeds the initial token.
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                match tx.try_send(()) {
                    Ok(()) | Err(mpsc::error::TrySendError::Full(())) => {}
                    Err(mpsc::error::TrySendError::Closed(())) => return,
                }
            }
        });

        Self {
            rx: tokio::sync::Mutex::new(rx),
            wait,
        }
    }

    /// Wait for a token. Returns false if the wait budget ran out.
    pub async fn acquire(&self) -> bool {
        let recv = async {
            let mut rx = self.rx.lock().await;
            rx.recv().await
        };
        matches!(timeout(self.wait, recv).await, Ok(Some(())))
    }
}
