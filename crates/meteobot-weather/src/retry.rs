//! Retry policy for upstream weather requests.
//!
//! Every failure is retried while attempts remain:
//! - 429 Too Many Requests waits `base_delay * attempt` (linear backoff)
//! - Other statuses, timeouts and transport errors wait `base_delay`
//!
//! No wait follows the final attempt.

use std::time::Duration;

use crate::types::UpstreamErrorKind;

/// Default retry configuration
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY_SECS: u64 = 2;

/// Retry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per fetch, including the first
    pub max_attempts: u32,
    /// Delay unit between attempts
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_secs(DEFAULT_BASE_DELAY_SECS),
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy with custom settings
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Wait after failed attempt `attempt` (1-based), or `None` if it was
    /// the last one
    pub fn delay_after(&self, attempt: u32, kind: UpstreamErrorKind) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        let delay = match kind {
            UpstreamErrorKind::RateLimited => self.base_delay.saturating_mul(attempt),
            UpstreamErrorKind::Timeout | UpstreamErrorKind::ServerError => self.base_delay,
        };
        Some(delay)
    }
}
