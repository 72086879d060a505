//! Startup retry with exponential backoff.
//!
//! Connection attempts are the only retried operations in this
//! workspace; query-level errors propagate to the caller unretried.

use std::collections::hash_map::RandomState;
use std::future::Future;
use std::hash::BuildHasher;
use std::time::Duration;
use tracing::{debug, warn};

/// Backoff schedule for connection attempts
///
/// An operation runs `max_retries + 1` times in total. Delays grow by
/// `backoff_multiplier` per retry, capped at `max_delay_ms`, with
/// jitter shaving up to half of each delay to spread out restarts.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub use_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 100,
            max_delay_ms: 5000,
            backoff_multiplier: 2.0,
            use_jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay_ms: u64) -> Self {
        self.initial_delay_ms = delay_ms;
        self
    }

    pub fn with_max_delay(mut self, delay_ms: u64) -> Self {
        self.max_delay_ms = delay_ms;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.use_jitter = false;
        self
    }

    /// Delay before the given retry (1-based), capped and jittered
    fn delay_before(&self, retry: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(retry.saturating_sub(1) as i32);
        let mut ms = ((self.initial_delay_ms as f64) * factor) as u64;
        ms = ms.min(self.max_delay_ms);
        if self.use_jitter {
            ms = jitter(ms);
        }
        Duration::from_millis(ms)
    }
}

/// Run `operation` until it succeeds or the schedule is exhausted,
/// returning the last error
pub async fn retry_with_backoff<F, Fut, T, E>(mut operation: F, config: RetryConfig) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    for retry in 1..=config.max_retries {
        match operation().await {
            Ok(value) => {
                if retry > 1 {
                    debug!("Operation succeeded after {} retries", retry - 1);
                }
                return Ok(value);
            }
            Err(e) => {
                let delay = config.delay_before(retry);
                debug!(
                    "Operation failed (attempt {}/{}): {}. Next try in {:?}",
                    retry,
                    config.max_retries + 1,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }

    operation().await.inspect_err(|e| {
        warn!(
            "Operation failed after {} attempts: {}",
            config.max_retries + 1,
            e
        );
    })
}

/// Scale a delay to 50-99% of its value to avoid synchronized restarts
fn jitter(ms: u64) -> u64 {
    let roll = RandomState::new().hash_one(std::time::SystemTime::now()) % 50;
    ms * (50 + roll) / 100
}
