//! Bounded retry with exponential backoff for transient collaborator errors.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::Result;

/// Configuration for retry behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first call.
    pub max_retries: u32,
    /// Initial delay between retries.
    #[serde(with = "millis")]
    pub initial_delay: Duration,
    /// Maximum delay (cap for exponential growth).
    #[serde(with = "millis")]
    pub max_delay: Duration,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Whether to add jitter to delays.
    pub jitter: bool,
}

impl RetryConfig {
    /// Create a new retry configuration.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }

    /// Configuration that never retries.
    pub fn none() -> Self {
        Self::new(0)
    }

    /// Set initial delay.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set maximum delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set backoff multiplier.
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Enable or disable jitter.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Calculate delay for a given attempt number.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_delay = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32);

        let capped_delay = base_delay.min(self.max_delay.as_millis() as f64);

        let final_delay = if self.jitter {
            // +/- 25%
            let jitter_factor = 0.75 + (rand::random::<f64>() * 0.5);
            capped_delay * jitter_factor
        } else {
            capped_delay
        };

        Duration::from_millis(final_delay as u64)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(3)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

/// Runs idempotent operations, repeating them while they fail transiently.
///
/// Only errors for which [`crate::Error::is_transient`] holds are retried; every
/// other error is returned from the first attempt unchanged.
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    /// Create a new retry executor.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Execute an operation with retry logic.
    ///
    /// `label` names the operation in log output.
    pub async fn execute<F, Fut, T>(&self, label: &str, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        debug!(operation = label, retries = attempt, "Operation succeeded after retry");
                    }
                    return Ok(result);
                }
                Err(err) => {
                    if !err.is_transient() {
                        return Err(err);
                    }

                    attempt += 1;
                    if attempt > self.config.max_retries {
                        warn!(
                            operation = label,
                            attempts = attempt,
                            error = %err,
                            "Giving up on transient failure"
                        );
                        return Err(err);
                    }

                    let delay = self.config.delay_for_attempt(attempt - 1);
                    warn!(
                        operation = label,
                        attempt,
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        "Transient failure, retrying"
                    );

                    sleep(delay).await;
                }
            }
        }
    }

    /// Get the retry configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}
