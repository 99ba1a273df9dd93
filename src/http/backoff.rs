//! Retry backoff strategies
//!
//! The client never sleeps directly; it asks its [`Backoff`] for a delay
//! and then waits through it.

use crate::types::BackoffType;
use async_trait::async_trait;
use std::time::Duration;

/// Delay policy between retryable failures
#[async_trait]
pub trait Backoff: Send + Sync + std::fmt::Debug {
    /// Delay before retry number `attempt` (zero based)
    fn delay(&self, attempt: u32) -> Duration;

    /// Wait for `delay`
    async fn wait(&self, delay: Duration);
}

/// Constant, linear or exponential backoff capped at `max`
#[derive(Debug, Clone)]
pub struct ConfiguredBackoff {
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Initial delay
    pub initial: Duration,
    /// Maximum delay
    pub max: Duration,
}

impl ConfiguredBackoff {
    /// Create a new backoff policy
    pub fn new(backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        Self {
            backoff_type,
            initial,
            max,
        }
    }
}

impl Default for ConfiguredBackoff {
    fn default() -> Self {
        Self::new(
            BackoffType::Exponential,
            Duration::from_secs(1),
            Duration::from_secs(60),
        )
    }
}

#[async_trait]
impl Backoff for ConfiguredBackoff {
    fn delay(&self, attempt: u32) -> Duration {
        let delay = match self.backoff_type {
            BackoffType::Constant => self.initial,
            BackoffType::Linear => self.initial.saturating_mul(attempt.saturating_add(1)),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.initial.saturating_mul(factor)
            }
        };

        std::cmp::min(delay, self.max)
    }

    async fn wait(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Backoff that never waits
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBackoff;

#[async_trait]
impl Backoff for NoBackoff {
    fn delay(&self, _attempt: u32) -> Duration {
        Duration::ZERO
    }

    async fn wait(&self, _delay: Duration) {}
}
