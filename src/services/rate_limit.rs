use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;

/// Sliding-window limiter keyed by client address: at most `max` accepted
/// requests per key per rolling `window`. Rejections are outright; nothing
/// is queued, and a rejected request touches neither store nor cache.
pub struct RateLimiter {
    max: usize,
    window: Duration,
    accepted: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(max: usize, window: Duration) -> Self {
        RateLimiter {
            max: max.max(1),
            window,
            accepted: Mutex::new(HashMap::new()),
        }
    }

    /// Records and admits the request if the client has budget left in the
    /// current window, otherwise rejects without recording.
    pub async fn try_acquire(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut accepted = self.accepted.lock().await;
        let hits = accepted.entry(key.to_string()).or_default();
        while let Some(front) = hits.front() {
            if now.duration_since(*front) >= self.window {
                hits.pop_front();
            } else {
                break;
            }
        }
        if hits.len() < self.max {
            hits.push_back(now);
            true
        } else {
            false
        }
    }

    /// Drops clients with no accepted request inside the current window.
    pub async fn sweep_idle(&self) {
        let now = Instant::now();
        let mut accepted = self.accepted.lock().await;
        accepted.retain(|_, hits| {
            hits.back()
                .is_some_and(|last| now.duration_since(*last) < self.window)
        });
    }
}

/// Route-layer middleware gating the throttled endpoints.
pub async fn enforce(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = client_key(&req);
    if state.limiter.try_acquire(&key).await {
        Ok(next.run(req).await)
    } else {
        warn!(client = %key, "request rejected by rate limiter");
        Err(AppError::RateLimited)
    }
}

// Prefer the forwarded address set by the fronting proxy; fall back to the
// socket peer when the service is hit directly.
fn client_key(req: &Request) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return forwarded.to_string();
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn tenth_request_accepted_eleventh_rejected() {
        let limiter = RateLimiter::new(10, Duration::from_secs(60));
        for _ in 0..10 {
            assert!(limiter.try_acquire("10.0.0.1").await);
        }
        assert!(!limiter.try_acquire("10.0.0.1").await);
    }

    #[tokio::test(start_paused = true)]
    async fn window_slides_and_budget_returns() {
        let limiter = RateLimiter::new(10, Duration::from_secs(60));
        for _ in 0..10 {
            assert!(limiter.try_acquire("10.0.0.1").await);
        }
        assert!(!limiter.try_acquire("10.0.0.1").await);

        advance(Duration::from_secs(61)).await;
        assert!(limiter.try_acquire("10.0.0.1").await);
    }

    #[tokio::test(start_paused = true)]
    async fn clients_are_limited_independently() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.try_acquire("10.0.0.1").await);
        assert!(!limiter.try_acquire("10.0.0.1").await);
        assert!(limiter.try_acquire("10.0.0.2").await);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_requests_do_not_extend_the_window() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.try_acquire("10.0.0.1").await);

        advance(Duration::from_secs(30)).await;
        assert!(!limiter.try_acquire("10.0.0.1").await);

        advance(Duration::from_secs(31)).await;
        assert!(limiter.try_acquire("10.0.0.1").await);
    }
}
