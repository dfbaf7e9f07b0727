// =============================================================================
// Retry policy: bounded exponential backoff for transient upstream errors
// =============================================================================
//
// Only gateway-class statuses are retried. Delays double from `base_delay`:
// with the defaults that is 1s, 2s, 4s, 8s, 16s before giving up.
// =============================================================================

use std::time::Duration;

use reqwest::StatusCode;

/// Statuses that indicate a transient server-side condition.
pub const RETRYABLE_STATUSES: [StatusCode; 3] = [
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn is_retryable(status: StatusCode) -> bool {
        RETRYABLE_STATUSES.contains(&status)
    }

    /// Delay before retry number `retry` (zero-based), or `None` once the
    /// budget is spent.
    pub fn delay_for(&self, retry: u32) -> Option<Duration> {
        if retry >= self.max_retries {
            return None;
        }
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        Some(self.base_delay.saturating_mul(factor))
    }
}
