//! Attempt budget and backoff.

use std::time::Duration;

use trawl_config::UpstreamConfig;

/// Retry behavior for transient upstream failures.
///
/// Timeouts, connection failures, 5xx and 429 are transient. Backoff is a
/// fixed wait, not exponential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial one). Zero acts as one.
    pub max_attempts: u32,
    /// Wait between a transient failure and the next attempt.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub const fn from_config(config: &UpstreamConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            backoff: config.backoff(),
        }
    }

    /// No retries.
    #[must_use]
    pub const fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }

    pub(crate) fn budget(&self) -> u32 {
        self.max_attempts.max(1)
    }
}
