//! Retry policy and backoff calculation.
//!
//! Only idempotent reads are retried: a request is retried when it is a
//! GET, its retry budget is not spent and the backend answered with one of
//! the retryable statuses. Failures where no response arrived (network
//! errors, timeouts) are surfaced immediately.
//!
//! The retry loop itself lives in the client dispatch path; this module
//! only decides *whether* and *how long*.

use std::time::Duration;

use crate::types::{Method, RequestDescriptor};

/// Statuses retried by default.
pub const DEFAULT_RETRY_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Configuration for retry behaviour on transient HTTP statuses.
///
/// Uses exponential backoff without jitter:
///
/// ```rust
/// # use godpanel::RetryPolicy;
/// # use std::time::Duration;
/// let policy = RetryPolicy::new()
///     .max_retries(5)
///     .base_delay(Duration::from_millis(200));
/// assert_eq!(policy.delay_for_retry(3), Duration::from_millis(800));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the initial attempt. Default: 3.
    pub max_retries: u32,
    /// Delay before the first retry. Default: 1s.
    pub base_delay: Duration,
    /// Growth factor between consecutive delays. Default: 2.
    pub multiplier: u32,
    /// Statuses that qualify for a retry.
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            multiplier: 2,
            retry_statuses: DEFAULT_RETRY_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// A policy that never retries.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn multiplier(mut self, factor: u32) -> Self {
        self.multiplier = factor;
        self
    }

    /// Replace the set of retryable statuses.
    pub fn retry_statuses(mut self, statuses: impl Into<Vec<u16>>) -> Self {
        self.retry_statuses = statuses.into();
        self
    }

    /// Whether `request`, having failed with `status`, gets another attempt.
    ///
    /// `status` is `None` when no response was received; those are never retried.
    pub fn should_retry(&self, request: &RequestDescriptor, status: Option<u16>) -> bool {
        request.retry_count() < self.max_retries
            && request.method == Method::Get
            && status.is_some_and(|s| self.retry_statuses.contains(&s))
    }

    /// Delay before retry number `retry` (1-based): `base × multiplier^(retry−1)`.
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let factor = self
            .multiplier
            .saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}
