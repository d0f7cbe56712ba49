//! Retry policy for page requests
//!
//! Decides which responses are worth another attempt and how long to wait
//! before it. Backoff doubles on every retry: with a factor of 0.3 the waits
//! are 0.3s, 0.6s, 1.2s, 2.4s.

use crate::config::RetryConfig;
use std::time::Duration;

/// Statuses whose `Retry-After` header is taken into account
pub const RETRY_AFTER_STATUSES: [u16; 3] = [413, 429, 503];

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_factor: f64,
    backoff_max: Duration,
    status_forcelist: Vec<u16>,
    respect_retry_after: bool,
}

impl RetryPolicy {
    /// Creates a policy retrying 500, 502, 503 and 504 responses
    ///
    /// # Arguments
    ///
    /// * `max_attempts` - Total attempts, the first one included
    /// * `backoff_factor` - Seconds to wait before the first retry
    pub fn new(max_attempts: u32, backoff_factor: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_factor: backoff_factor.max(0.0),
            backoff_max: Duration::from_secs(120),
            status_forcelist: vec![500, 502, 503, 504],
            respect_retry_after: true,
        }
    }

    /// Builds the policy described by the `[retry]` config section
    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.backoff_factor)
            .with_backoff_max(Duration::from_secs_f64(config.backoff_max_secs.max(0.0)))
            .with_status_forcelist(config.status_forcelist.clone())
            .with_retry_after(config.respect_retry_after)
    }

    /// Replaces the set of statuses that trigger a retry
    pub fn with_status_forcelist(mut self, statuses: Vec<u16>) -> Self {
        self.status_forcelist = statuses;
        self
    }

    /// Caps every single wait, including `Retry-After` hints
    pub fn with_backoff_max(mut self, backoff_max: Duration) -> Self {
        self.backoff_max = backoff_max;
        self
    }

    /// Enables or disables honoring `Retry-After` headers
    pub fn with_retry_after(mut self, respect: bool) -> Self {
        self.respect_retry_after = respect;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns true if a `Retry-After` header on this status replaces the backoff
    ///
    /// Only 413, 429 and 503 carry a meaningful hint; on other statuses the
    /// header is ignored and regular backoff applies.
    pub fn honors_retry_after(&self, status: u16) -> bool {
        self.respect_retry_after && RETRY_AFTER_STATUSES.contains(&status)
    }

    /// Returns true if a response with this status should be retried
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.status_forcelist.contains(&status)
    }

    /// Wait before retry number `retry` (1 for the first retry)
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }

        let exponent = (retry - 1).min(30) as i32;
        let millis = (self.backoff_factor * 1000.0 * 2f64.powi(exponent)).round();
        Duration::from_millis(millis as u64).min(self.backoff_max)
    }

    /// Wait requested by a `Retry-After: <seconds>` header, capped
    pub fn retry_after_wait(&self, secs: u64) -> Duration {
        Duration::from_secs(secs).min(self.backoff_max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
