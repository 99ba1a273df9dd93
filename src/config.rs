//! Source configuration
//!
//! The JSON document passed with `--config`. Only `subdomain` and
//! `credentials` are required; everything else has a default.

use crate::auth::Credentials;
use crate::datetime::{default_start_date, str_to_datetime};
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::stream::StreamArgs;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of streams read at the same time
pub const DEFAULT_STREAM_CONCURRENCY: usize = 4;

/// Zendesk Support source configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Tenant subdomain (`{subdomain}.zendesk.com`)
    pub subdomain: String,

    /// Earliest data to replicate, `YYYY-MM-DDTHH:MM:SSZ`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    /// API token or OAuth credentials
    pub credentials: Credentials,

    /// Replaces `https://{subdomain}.zendesk.com/api/v2/`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    /// Retries per request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,

    /// Client-side request budget
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests_per_minute: Option<u32>,

    /// Streams read concurrently
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_concurrency: Option<usize>,
}

impl SourceConfig {
    /// Minimal config
    pub fn new(subdomain: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            subdomain: subdomain.into(),
            start_date: None,
            credentials,
            api_base_url: None,
            max_retries: None,
            requests_per_minute: None,
            stream_concurrency: None,
        }
    }

    /// Set the start date
    #[must_use]
    pub fn with_start_date(mut self, start_date: impl Into<String>) -> Self {
        self.start_date = Some(start_date.into());
        self
    }

    /// Point the source at a different API base
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Load and validate a config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_json(&contents)
    }

    /// Parse and validate an inline JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check required fields and the start date format
    pub fn validate(&self) -> Result<()> {
        if self.subdomain.trim().is_empty() {
            return Err(Error::missing_field("subdomain"));
        }
        if let Some(start_date) = &self.start_date {
            str_to_datetime(start_date)?;
        }
        if self.stream_concurrency == Some(0) {
            return Err(Error::config("stream_concurrency must be at least 1"));
        }
        Ok(())
    }

    /// Configured start date, or two years ago
    pub fn start_date(&self) -> String {
        self.start_date.clone().unwrap_or_else(default_start_date)
    }

    /// Arguments shared by every stream
    pub fn stream_args(&self) -> StreamArgs {
        let args = StreamArgs::new(self.subdomain.clone(), self.start_date());
        match &self.api_base_url {
            Some(url) => args.with_api_base_url(url.clone()),
            None => args,
        }
    }

    /// HTTP client settings derived from this config
    pub fn http_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder();
        if let Some(retries) = self.max_retries {
            builder = builder.max_retries(retries);
        }
        if let Some(rpm) = self.requests_per_minute {
            let defaults = RateLimiterConfig::default();
            builder = builder.rate_limit(RateLimiterConfig::new(rpm, defaults.burst_size.min(rpm.max(1))));
        }
        builder.build()
    }

    /// Streams read concurrently
    pub fn stream_concurrency(&self) -> usize {
        self.stream_concurrency.unwrap_or(DEFAULT_STREAM_CONCURRENCY)
    }
}
