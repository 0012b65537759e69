//! Exponential backoff for retried requests

use std::time::Duration;

/// How often and how patiently a retried call is repeated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound for the backoff before jitter
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Default delays with the given attempt count (at least one)
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Backoff after failed attempt number `attempt` (zero based)
    ///
    /// `base_delay * 2^attempt`, capped at `max_delay`, plus up to 10% jitter.
    pub fn delay(&self, attempt: u32) -> Duration {
        let backoff = self
            .base_delay
            .saturating_mul(2_u32.saturating_pow(attempt.min(16)))
            .min(self.max_delay);
        let jitter = backoff.mul_f64(rand::random::<f64>() * 0.1);
        backoff + jitter
    }
}
