//! Sliding-window rate limiter (spec.md §4.I, §6 "standard rate-limit
//! headers"), grounded directly in the teacher's
//! `examples/omo-protocol-defi-flow/src/api/rate_limit.rs`, generalized
//! from a hardcoded window/cap to the values in [`crate::config::GatewayConfig`]
//! and keyed by authenticated DID or, failing that, caller IP.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    requests: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(window_secs: u64, max_requests: usize) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
            requests: Mutex::new(HashMap::new()),
        }
    }

    /// Returns `Ok(remaining)` if allowed, `Err(retry_after_secs)` if the
    /// caller has exhausted its window.
    pub async fn check(&self, key: &str) -> Result<usize, u64> {
        let mut map = self.requests.lock().await;
        let now = Instant::now();
        let entry = map.entry(key.to_string()).or_default();

        while entry.front().is_some_and(|t| now.duration_since(*t) > self.window) {
            entry.pop_front();
        }

        if entry.len() >= self.max_requests {
            let oldest = *entry.front().unwrap();
            let retry_after = self.window.as_secs().saturating_sub(now.duration_since(oldest).as_secs());
            return Err(retry_after.max(1));
        }

        entry.push_back(now);
        Ok(self.max_requests - entry.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allows_up_to_the_configured_cap() {
        let limiter = RateLimiter::new(60, 2);
        assert!(limiter.check("a").await.is_ok());
        assert!(limiter.check("a").await.is_ok());
        assert!(limiter.check("a").await.is_err());
    }

    #[tokio::test]
    async fn different_keys_have_independent_windows() {
        let limiter = RateLimiter::new(60, 1);
        assert!(limiter.check("a").await.is_ok());
        assert!(limiter.check("b").await.is_ok());
    }
}
