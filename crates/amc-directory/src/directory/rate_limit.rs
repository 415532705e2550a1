use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::http::HeaderMap;

use crate::config::RateLimitConfig;

/// Counter backend for fixed-window rate limiting.
///
/// `increment` adds one hit for `key` and returns the hit count inside the
/// current window, starting a fresh window of length `window` when the
/// previous one has expired. Implementations may live outside the process
/// (for example a shared cache) so several instances enforce one limit.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    async fn increment(&self, key: &str, window: Duration) -> Result<u64, RateLimitError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("rate limit store unavailable: {0}")]
    Unavailable(String),
}

const PURGE_THRESHOLD: usize = 10_000;

struct WindowState {
    resets_at: Instant,
    count: u64,
}

/// Process-local store; only correct for single-instance deployments.
#[derive(Clone, Default)]
pub struct InMemoryRateLimitStore {
    windows: Arc<Mutex<HashMap<String, WindowState>>>,
}

impl InMemoryRateLimitStore {
    fn increment_at(
        &self,
        key: &str,
        window: Duration,
        now: Instant,
    ) -> Result<u64, RateLimitError> {
        let mut windows = self
            .windows
            .lock()
            .map_err(|_| RateLimitError::Unavailable("rate limiter mutex poisoned".to_string()))?;

        if windows.len() >= PURGE_THRESHOLD && !windows.contains_key(key) {
            windows.retain(|_, state| state.resets_at >= now);
        }

        let state = windows.entry(key.to_string()).or_insert(WindowState {
            resets_at: now + window,
            count: 0,
        });

        if now > state.resets_at {
            state.resets_at = now + window;
            state.count = 0;
        }

        state.count += 1;
        Ok(state.count)
    }

    /// Drops windows that have already expired.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        match self.windows.lock() {
            Ok(mut windows) => {
                let before = windows.len();
                windows.retain(|_, state| state.resets_at >= now);
                before - windows.len()
            }
            Err(_) => 0,
        }
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows.lock().map(|windows| windows.len()).unwrap_or(0)
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn increment(&self, key: &str, window: Duration) -> Result<u64, RateLimitError> {
        self.increment_at(key, window, Instant::now())
    }
}

/// Result of checking one request against the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { remaining: u64 },
    Limited { retry_after: Duration },
}

/// Fixed-window limiter: count-and-compare against `max_requests` per window.
pub struct FixedWindowLimiter<L> {
    store: Arc<L>,
    config: RateLimitConfig,
}

impl<L> FixedWindowLimiter<L>
where
    L: RateLimitStore,
{
    pub fn new(store: Arc<L>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    pub async fn check(&self, key: &str) -> Result<RateLimitDecision, RateLimitError> {
        let count = self.store.increment(key, self.config.window).await?;
        if count > self.config.max_requests {
            Ok(RateLimitDecision::Limited {
                retry_after: self.config.window,
            })
        } else {
            Ok(RateLimitDecision::Allowed {
                remaining: self.config.max_requests - count,
            })
        }
    }
}

/// Identifies the caller: first valid `X-Forwarded-For` entry, then
/// `X-Real-IP`, then the socket peer, then `"unknown"`.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(ip) = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.split(',').map(str::trim).find_map(parse_ip_addr))
    {
        return ip.to_string();
    }

    if let Some(ip) = headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| parse_ip_addr(raw.trim()))
    {
        return ip.to_string();
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn parse_ip_addr(raw: &str) -> Option<IpAddr> {
    raw.parse::<IpAddr>()
        .ok()
        .or_else(|| raw.parse::<SocketAddr>().ok().map(|addr| addr.ip()))
}
