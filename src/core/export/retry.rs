//! Bounded exponential backoff for search requests

use crate::adapters::search::SearchResult;
use crate::config::RetryConfig;
use crate::log_retry_attempt;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Retry schedule applied to each search request
///
/// Only errors that [`SearchError::is_retryable`](crate::domain::SearchError::is_retryable)
/// are retried. The delay before retry `n` is
/// `initial_delay * multiplier^(n-1)`, capped at `max_delay`, with the
/// actual sleep drawn uniformly from the upper half of that value.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: usize,
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
    jitter: bool,
}

impl RetryPolicy {
    /// Builds a policy from `[search.retry]`
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            multiplier: config.backoff_multiplier,
            jitter: true,
        }
    }

    /// A policy that never retries
    pub fn none() -> Self {
        Self::immediate(0)
    }

    /// Retries up to `max_retries` times without sleeping
    pub fn immediate(max_retries: usize) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            multiplier: 1.0,
            jitter: false,
        }
    }

    /// Maximum retries after the first attempt
    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// Backoff ceiling before retry `attempt` (1-based), without jitter
    pub fn backoff_for(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as usize) as i32;
        let factor = self.multiplier.powi(exponent);
        let millis = (self.initial_delay.as_millis() as f64 * factor)
            .min(self.max_delay.as_millis() as f64);
        Duration::from_millis(millis as u64)
    }

    /// Delay to sleep before retry `attempt` (1-based)
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let ceiling = self.backoff_for(attempt).as_millis() as u64;
        if !self.jitter || ceiling == 0 {
            return Duration::from_millis(ceiling);
        }
        let floor = ceiling / 2;
        Duration::from_millis(rand::thread_rng().gen_range(floor..=ceiling))
    }

    /// Runs `operation`, retrying retryable failures
    ///
    /// Returns the first success, the first non-retryable error, or the
    /// last error once the budget is spent.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> SearchResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = SearchResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.delay_for(attempt);
                    log_retry_attempt!(attempt, self.max_retries, delay.as_millis() as u64, e);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
