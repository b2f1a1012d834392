//! Retry pacing and bounds for the fetcher.

use std::time::Duration;

/// Linear backoff: the wait after failed attempt `n` is `n * base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Delay after the first failed attempt.
    pub base: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(2),
        }
    }
}

impl Backoff {
    /// Delay to wait after `attempt` (1-based) failed.
    pub fn delay(self, attempt: u32) -> Duration {
        self.base.saturating_mul(attempt.max(1))
    }
}

/// Configuration for the fetch retry loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts including the first one. Zero is treated as one.
    pub max_attempts: u32,
    /// The backoff strategy to use between retries.
    pub backoff: Backoff,
    /// Bound on a single request, body read included.
    pub request_timeout: Duration,
    /// Bound on the whole fetch, backoff sleeps included.
    pub deadline: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::default(),
            request_timeout: Duration::from_secs(30),
            deadline: Some(Duration::from_secs(120)),
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with linear backoff.
    pub fn linear(base: Duration, max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: Backoff { base },
            ..Self::default()
        }
    }

    /// Disable retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Only server errors are worth another try.
    pub const fn should_retry_status(&self, status: u16) -> bool {
        status >= 500
    }

    /// Calculate the delay after a given failed attempt.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }
}
