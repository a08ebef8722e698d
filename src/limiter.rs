//! Sliding-window rate limiting for save attempts.
//!
//! Tracks attempts per identity over a rolling window. The gate is split
//! in two: [`check`](RateLimiter::check) asks whether another attempt is
//! allowed, [`record`](RateLimiter::record) counts one. The save pipeline
//! checks before authenticating and records only once a request has
//! passed its security checks, so rejected requests do not consume quota.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

/// Default cap on save attempts per window.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Default window length in seconds.
pub const DEFAULT_WINDOW_SECS: i64 = 60;

/// Per-identity sliding-window attempt counter.
#[derive(Debug)]
pub struct RateLimiter {
    max_attempts: u32,
    window: Duration,
    attempts: HashMap<String, Vec<DateTime<Utc>>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, Duration::seconds(DEFAULT_WINDOW_SECS))
    }
}

impl RateLimiter {
    /// A limiter allowing `max_attempts` recorded attempts per `window`.
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            attempts: HashMap::new(),
        }
    }

    /// Whether `identity` may make another attempt right now.
    pub fn check(&mut self, identity: &str) -> bool {
        self.check_at(identity, Utc::now())
    }

    /// Count an attempt for `identity` now.
    pub fn record(&mut self, identity: &str) {
        self.record_at(identity, Utc::now());
    }

    /// Clock-injected variant of [`check`](Self::check).
    pub fn check_at(&mut self, identity: &str, now: DateTime<Utc>) -> bool {
        self.prune(identity, now);
        let count = self.attempts.get(identity).map_or(0, Vec::len);
        count < self.max_attempts as usize
    }

    /// Clock-injected variant of [`record`](Self::record).
    pub fn record_at(&mut self, identity: &str, now: DateTime<Utc>) {
        self.prune(identity, now);
        self.attempts.entry(identity.to_string()).or_default().push(now);
    }

    /// Drop attempts that have slid out of the window.
    fn prune(&mut self, identity: &str, now: DateTime<Utc>) {
        if let Some(stamps) = self.attempts.get_mut(identity) {
            let cutoff = now - self.window;
            stamps.retain(|stamp| *stamp > cutoff);
            if stamps.is_empty() {
                self.attempts.remove(identity);
            }
        }
    }
}
