//! Retrying provider wrapper
//!
//! Transient provider failures (connection, rate limit) are retried here,
//! inside the generation collaborator, with jittered exponential backoff. The
//! game state machine itself never retries.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::{LlmError, LlmProvider, LlmRequest, LlmResponse};

/// Backoff settings
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(400),
            max_delay: Duration::from_secs(4),
            multiplier: 2.0,
        }
    }
}

/// Wraps any provider and retries transient failures
#[derive(Debug)]
pub struct RetryingProvider<P: LlmProvider> {
    inner: P,
    config: RetryConfig,
    retries: AtomicU64,
}

impl<P: LlmProvider> RetryingProvider<P> {
    pub fn new(provider: P, config: RetryConfig) -> Self {
        Self {
            inner: provider,
            config,
            retries: AtomicU64::new(0),
        }
    }

    /// Total retries performed so far
    pub fn retries(&self) -> u64 {
        self.retries.load(Ordering::Relaxed)
    }

    fn jittered(delay: Duration) -> Duration {
        let ms = delay.as_millis() as f64;
        let jitter = ms * 0.1;
        Duration::from_millis((ms + (rand::random::<f64>() * 2.0 - 1.0) * jitter).max(0.0) as u64)
    }
}

#[async_trait]
impl<P: LlmProvider + 'static> LlmProvider for RetryingProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn is_available(&self) -> bool {
        self.inner.is_available().await
    }

    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let mut delay = self.config.initial_delay;
        let mut attempt = 0;

        loop {
            match self.inner.complete(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    self.retries.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        provider = %self.inner.name(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying generation after failure"
                    );
                    tokio::time::sleep(Self::jittered(delay)).await;
                    delay = Duration::from_millis(
                        (delay.as_millis() as f64 * self.config.multiplier) as u64,
                    )
                    .min(self.config.max_delay);
                }
                Err(e) => return Err(e),
            }
        }
    }
}
