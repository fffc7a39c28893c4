use std::env;
use std::time::Duration;

use tracing::info;

use crate::error::{ConfigError, Result};

pub const DEFAULT_CDX_URL: &str = "http://web.archive.org/cdx/search/cdx";
pub const DEFAULT_REPLAY_URL: &str = "https://web.archive.org/web";

/// Connection and pacing settings for talking to the archive.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    // Endpoints
    pub cdx_url: String,
    pub replay_url: String,

    // Paging
    pub page_size: u32,

    // HTTP
    pub timeout: Duration,
    pub user_agent: String,

    // Pacing
    pub page_delay: Duration,
    pub failure_backoff: Duration,
    pub max_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cdx_url: DEFAULT_CDX_URL.to_string(),
            replay_url: DEFAULT_REPLAY_URL.to_string(),
            page_size: 50_000,
            timeout: Duration::from_secs(60),
            user_agent: concat!("wayback-lens/", env!("CARGO_PKG_VERSION")).to_string(),
            page_delay: Duration::from_secs(1),
            failure_backoff: Duration::from_secs(5),
            max_attempts: 1,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let cdx_url = non_empty(&lookup, "WAYBACK_CDX_URL")?.unwrap_or(defaults.cdx_url);
        let replay_url =
            non_empty(&lookup, "WAYBACK_REPLAY_URL")?.unwrap_or(defaults.replay_url);
        let user_agent =
            non_empty(&lookup, "WAYBACK_USER_AGENT")?.unwrap_or(defaults.user_agent);

        let page_size = parsed(&lookup, "WAYBACK_PAGE_SIZE", "a positive integer")?
            .unwrap_or(defaults.page_size);
        if page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "WAYBACK_PAGE_SIZE",
                expected: "a positive integer",
                value: "0".into(),
            });
        }

        let timeout = parsed(&lookup, "WAYBACK_TIMEOUT_SECS", "a number of seconds")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        let page_delay = parsed(&lookup, "WAYBACK_PAGE_DELAY_MS", "a number of milliseconds")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.page_delay);
        let failure_backoff =
            parsed(&lookup, "WAYBACK_FAILURE_BACKOFF_MS", "a number of milliseconds")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.failure_backoff);
        let max_attempts = parsed(&lookup, "WAYBACK_MAX_ATTEMPTS", "an integer of at least 1")?
            .unwrap_or(defaults.max_attempts)
            .max(1);

        Ok(Self {
            cdx_url: cdx_url.trim_end_matches('/').to_string(),
            replay_url: replay_url.trim_end_matches('/').to_string(),
            page_size,
            timeout,
            user_agent,
            page_delay,
            failure_backoff,
            max_attempts,
        })
    }

    /// Log the effective configuration.
    pub fn log_summary(&self) {
        info!(
            cdx_url = self.cdx_url.as_str(),
            replay_url = self.replay_url.as_str(),
            page_size = self.page_size,
            timeout_secs = self.timeout.as_secs(),
            page_delay_ms = self.page_delay.as_millis() as u64,
            failure_backoff_ms = self.failure_backoff.as_millis() as u64,
            max_attempts = self.max_attempts,
            "Archive configuration"
        );
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<String>> {
    match lookup(key) {
        Some(v) if v.trim().is_empty() => Err(ConfigError::Empty { key }),
        Some(v) => Ok(Some(v.trim().to_string())),
        None => Ok(None),
    }
}

fn parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    expected: &'static str,
) -> Result<Option<T>> {
    match lookup(key) {
        Some(v) => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, expected, value: v }),
        None => Ok(None),
    }
}
