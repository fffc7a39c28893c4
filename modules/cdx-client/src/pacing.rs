use std::time::Duration;

use async_trait::async_trait;
use wayback_common::Config;

/// How the client spaces out page requests and what it does when one fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPolicy {
    /// Attempts per page before the page is abandoned. At least 1.
    pub max_attempts: u32,
    /// Pause after every successful page.
    pub page_delay: Duration,
    /// Pause after every failed attempt.
    pub failure_backoff: Duration,
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl PacingPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            page_delay: config.page_delay,
            failure_backoff: config.failure_backoff,
        }
    }

    /// No pauses, single attempt.
    pub fn immediate() -> Self {
        Self {
            max_attempts: 1,
            page_delay: Duration::ZERO,
            failure_backoff: Duration::ZERO,
        }
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }
}

/// Blocking pause between requests, injectable so tests can use a fake clock.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}
