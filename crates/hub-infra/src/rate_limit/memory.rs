//! In-memory rate limiter using the governor crate.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter as GovernorRateLimiter};

use hub_core::ports::{RateLimitError, RateLimitResult, RateLimiter};

/// Keys tracked before stale buckets are swept.
const SWEEP_THRESHOLD: usize = 10_000;

/// In-memory rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    /// Read `RATE_LIMIT_MAX_REQUESTS` and `RATE_LIMIT_WINDOW_SECS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_requests: std::env::var("RATE_LIMIT_MAX_REQUESTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_requests),
            window: std::env::var("RATE_LIMIT_WINDOW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.window),
        }
    }

    fn quota(&self) -> Quota {
        let burst = NonZeroU32::new(self.max_requests).unwrap_or(NonZeroU32::MIN);
        let period = (self.window / burst.get()).max(Duration::from_millis(1));

        Quota::with_period(period)
            .map(|q| q.allow_burst(burst))
            .unwrap_or_else(|| Quota::per_second(burst))
    }
}

/// Per-key GCRA limiter: each client address gets its own bucket of
/// `max_requests` that refills over `window`.
///
/// Note: Limits are per-process, not distributed across instances.
pub struct InMemoryRateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
    clock: DefaultClock,
}

impl InMemoryRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            limiter: GovernorRateLimiter::keyed(config.quota()),
            clock: DefaultClock::default(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(RateLimitConfig::from_env())
    }
}

#[async_trait]
impl RateLimiter for InMemoryRateLimiter {
    async fn check(&self, key: &str) -> Result<RateLimitResult, RateLimitError> {
        let outcome = self.limiter.check_key(&key.to_string());

        if self.limiter.len() > SWEEP_THRESHOLD {
            self.limiter.retain_recent();
        }

        Ok(match outcome {
            Ok(()) => RateLimitResult {
                allowed: true,
                reset_after: Duration::ZERO,
            },
            Err(not_until) => RateLimitResult {
                allowed: false,
                reset_after: not_until.wait_time_from(self.clock.now()),
            },
        })
    }
}
