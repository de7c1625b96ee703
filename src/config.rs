//! Runtime settings for fetching and collection.
//!
//! Settings come from an optional YAML file; every key is optional and falls
//! back to its default. Unknown keys are rejected so typos surface instead of
//! silently doing nothing.
//!
//! ```yaml
//! timeout_secs: 20
//! request_delay_ms: 1500
//! max_feed_items: 30
//! ```

use crate::error::ConfigError;
use crate::fetch::DEFAULT_USER_AGENT;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectorConfig {
    /// Hard limit for one request, body included.
    pub timeout_secs: u64,
    /// Minimum gap between two requests to the same source.
    pub request_delay_ms: u64,
    /// Items read from one feed, in document order.
    pub max_feed_items: usize,
    /// Feed items fetched concurrently.
    pub feed_concurrency: usize,
    /// URLs collected concurrently by the `collect` command.
    pub batch_concurrency: usize,
    pub user_agent: String,
    /// Retries after the first attempt for retryable failures.
    pub retry_attempts: usize,
    pub retry_base_delay_ms: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            request_delay_ms: 1_000,
            max_feed_items: 50,
            feed_concurrency: 4,
            batch_concurrency: 8,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry_attempts: 2,
            retry_base_delay_ms: 1_000,
        }
    }
}

impl CollectorConfig {
    /// Read settings from a YAML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Yaml`] when it is not valid or contains unknown keys.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: shown.clone(),
            source,
        })?;
        let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Yaml {
            path: shown.clone(),
            source,
        })?;
        info!(path = %shown, "Loaded collector configuration");
        Ok(config)
    }

    /// Parse settings from YAML text. An empty document yields the defaults.
    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str::<Self>(raw).map(Self::sanitized)
    }

    /// Clamp values that would stall the pipeline: zero concurrency becomes
    /// one and a zero timeout becomes one second.
    pub fn sanitized(mut self) -> Self {
        self.timeout_secs = self.timeout_secs.max(1);
        self.feed_concurrency = self.feed_concurrency.max(1);
        self.batch_concurrency = self.batch_concurrency.max(1);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}
