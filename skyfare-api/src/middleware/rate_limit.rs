use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use skyfare_store::RedisClient;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::state::AppState;

/// Decides whether a client may issue another search right now.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn check_rate_limit(&self, client_id: &str) -> bool;
}

struct Window {
    count: u32,
    reset_at: Instant,
}

/// In-process fixed-window limiter. Each instance counts independently.
pub struct FixedWindowLimiter {
    windows: DashMap<String, Window>,
    max_requests: u32,
    window: Duration,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
        }
    }

    pub fn check_at(&self, client_id: &str, now: Instant) -> bool {
        let mut entry = self
            .windows
            .entry(client_id.to_string())
            .or_insert_with(|| Window {
                count: 0,
                reset_at: now + self.window,
            });

        if now > entry.reset_at {
            entry.count = 0;
            entry.reset_at = now + self.window;
        }

        if entry.count >= self.max_requests {
            return false;
        }
        entry.count += 1;
        true
    }

    /// Drop windows that have already expired. Returns how many were removed.
    pub fn purge_expired(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, window| window.reset_at >= now);
        before.saturating_sub(self.windows.len())
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

#[async_trait]
impl RateLimiter for FixedWindowLimiter {
    async fn check_rate_limit(&self, client_id: &str) -> bool {
        self.check_at(client_id, Instant::now())
    }
}

/// Shared limiter for deployments running several API instances.
pub struct RedisRateLimiter {
    client: RedisClient,
    max_requests: u32,
    window_ms: u64,
}

impl RedisRateLimiter {
    pub fn new(client: RedisClient, max_requests: u32, window_ms: u64) -> Self {
        Self {
            client,
            max_requests,
            window_ms,
        }
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check_rate_limit(&self, client_id: &str) -> bool {
        match self
            .client
            .check_rate_limit(client_id, self.max_requests, self.window_ms)
            .await
        {
            Ok(allowed) => allowed,
            Err(e) => {
                // Fail open
                warn!("Redis rate limit check failed, allowing request: {}", e);
                true
            }
        }
    }
}

/// Shortest sweep period; `tokio::time::interval` rejects zero.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Periodically purge expired windows so idle clients don't pile up.
pub fn spawn_sweeper(limiter: Arc<FixedWindowLimiter>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every.max(MIN_SWEEP_INTERVAL));
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = limiter.purge_expired(Instant::now());
            if removed > 0 {
                debug!(removed, remaining = limiter.tracked_clients(), "Purged rate limit windows");
            }
        }
    })
}

/// First `X-Forwarded-For` hop when the peer is a trusted proxy, else the
/// peer address, else `"unknown"`. The header is ignored from any other peer.
pub fn client_id(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trusted_proxies: &[IpAddr],
) -> String {
    let behind_proxy = peer.is_some_and(|addr| trusted_proxies.contains(&addr.ip()));
    let forwarded = headers
        .get("x-forwarded-for")
        .filter(|_| behind_proxy)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    match (forwarded, peer) {
        (Some(ip), _) => ip.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => "unknown".to_string(),
    }
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_id(req.headers(), peer, &state.trusted_proxies);

    if !state.limiter.check_rate_limit(&client).await {
        warn!(client = %client, "Search rate limit exceeded");
        return Err(AppError::RateLimited);
    }

    Ok(next.run(req).await)
}
