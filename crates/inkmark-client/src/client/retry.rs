//! Retry configuration and logic for gateway calls.

use std::time::Duration;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts.
    pub max_retries: u32,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// HTTP status codes that trigger a retry.
    pub retry_on_status: Vec<u16>,
    /// Whether to respect the `Retry-After` header.
    pub respect_retry_after: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(5),
            retry_on_status: vec![408, 429, 502, 503, 504],
            respect_retry_after: true,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    #[must_use]
    pub fn with_initial_backoff(mut self, duration: Duration) -> Self {
        self.initial_backoff = duration;
        self
    }

    #[must_use]
    pub fn with_max_backoff(mut self, duration: Duration) -> Self {
        self.max_backoff = duration;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RetryDecision {
    Retry(Duration),
    DontRetry,
}

/// Mutable retry bookkeeping for one logical request.
#[derive(Debug, Clone)]
pub struct RetryState {
    pub attempts: u32,
    pub current_backoff: Duration,
    config: RetryConfig,
}

impl RetryState {
    pub fn new(config: RetryConfig) -> Self {
        Self {
            attempts: 0,
            current_backoff: config.initial_backoff,
            config,
        }
    }

    /// Decide on a transport-level failure (connect error, timeout).
    pub fn should_retry_error(&mut self) -> RetryDecision {
        self.decide_retry(None)
    }

    /// Decide on an HTTP status, honoring `Retry-After` when configured.
    pub fn should_retry_status(
        &mut self,
        status: u16,
        retry_after: Option<Duration>,
    ) -> RetryDecision {
        if !self.config.retry_on_status.contains(&status) {
            return RetryDecision::DontRetry;
        }
        self.decide_retry(retry_after)
    }

    fn decide_retry(&mut self, retry_after: Option<Duration>) -> RetryDecision {
        self.attempts += 1;
        if self.attempts > self.config.max_retries {
            return RetryDecision::DontRetry;
        }

        let wait = if self.config.respect_retry_after {
            retry_after.unwrap_or(self.current_backoff)
        } else {
            self.current_backoff
        };

        self.current_backoff = std::cmp::min(self.current_backoff * 2, self.config.max_backoff);

        RetryDecision::Retry(wait)
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
        self.current_backoff = self.config.initial_backoff;
    }
}

pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
