//! Configuration management for the appointment monitor
//!
//! This module handles loading and validating configuration from environment variables,
//! files, and command-line arguments.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::client::DEFAULT_ENDPOINT;
use crate::monitor::formatter::DEFAULT_DISPLAY_LIMIT;
use crate::notifications::channels::pushover::DEFAULT_PUSHOVER_ENDPOINT;
use crate::utils::parse_local_timestamp;

/// Allowed poll period range in seconds
pub const POLL_PERIOD_RANGE_SECS: std::ops::RangeInclusive<u64> = 10..=3600;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scheduling API configuration
    pub api: ApiConfig,

    /// Polling loop configuration
    pub monitor: MonitorConfig,

    /// Publisher credentials and endpoints
    pub publishers: PublisherConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Scheduling API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the scheduling API
    pub endpoint: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// User agent string
    pub user_agent: String,
}

/// Polling loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Location ids to monitor
    pub location_ids: Vec<u32>,

    /// Seconds to wait between cycles that found nothing
    pub poll_period_secs: u64,

    /// Seconds to wait after a cycle that published slots (defaults to poll period)
    pub backoff_period_secs: Option<u64>,

    /// Only slots starting strictly before this local date-time are published
    pub before: Option<NaiveDateTime>,

    /// Publisher selections, e.g. `Log` or `Webhook=https://...|text`
    pub publish_to: Vec<String>,

    /// Number of timestamps listed before eliding to the last one
    pub display_limit: usize,
}

/// Publisher credentials and endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Pushover application token
    pub pushover_app_token: Option<String>,

    /// Pushover messages endpoint
    pub pushover_endpoint: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_secs: 30,
            user_agent: format!("appointment-monitor/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            location_ids: Vec::new(),
            poll_period_secs: 30,
            backoff_period_secs: None,
            before: None,
            publish_to: vec!["Log".to_string()],
            display_limit: DEFAULT_DISPLAY_LIMIT,
        }
    }
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            pushover_app_token: None,
            pushover_endpoint: DEFAULT_PUSHOVER_ENDPOINT.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables on top of defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Override fields from `APPOINTMENT_MONITOR_*` and `PUSHOVER_APP_TOKEN`
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(endpoint) = std::env::var("APPOINTMENT_MONITOR_ENDPOINT") {
            self.api.endpoint = endpoint;
        }

        if let Ok(timeout) = std::env::var("APPOINTMENT_MONITOR_REQUEST_TIMEOUT") {
            self.api.request_timeout_secs = timeout
                .parse()
                .context("APPOINTMENT_MONITOR_REQUEST_TIMEOUT must be a valid number")?;
        }

        if let Ok(user_agent) = std::env::var("APPOINTMENT_MONITOR_USER_AGENT") {
            self.api.user_agent = user_agent;
        }

        if let Ok(ids) = std::env::var("APPOINTMENT_MONITOR_LOCATION_IDS") {
            self.monitor.location_ids = parse_location_ids(&ids)?;
        }

        if let Ok(poll) = std::env::var("APPOINTMENT_MONITOR_POLL_PERIOD") {
            self.monitor.poll_period_secs = poll
                .parse()
                .context("APPOINTMENT_MONITOR_POLL_PERIOD must be a valid number")?;
        }

        if let Ok(backoff) = std::env::var("APPOINTMENT_MONITOR_BACKOFF_PERIOD") {
            self.monitor.backoff_period_secs = Some(
                backoff
                    .parse()
                    .context("APPOINTMENT_MONITOR_BACKOFF_PERIOD must be a valid number")?,
            );
        }

        if let Ok(before) = std::env::var("APPOINTMENT_MONITOR_BEFORE") {
            self.monitor.before = Some(parse_local_timestamp(&before)?);
        }

        if let Ok(publish_to) = std::env::var("APPOINTMENT_MONITOR_PUBLISH_TO") {
            self.monitor.publish_to = split_list(&publish_to);
        }

        if let Ok(token) = std::env::var("PUSHOVER_APP_TOKEN") {
            if !token.trim().is_empty() {
                self.publishers.pushover_app_token = Some(token.trim().to_string());
            }
        }

        if let Ok(level) = std::env::var("APPOINTMENT_MONITOR_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(format) = std::env::var("APPOINTMENT_MONITOR_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.api.endpoint.starts_with("http://") && !self.api.endpoint.starts_with("https://")
        {
            anyhow::bail!("API endpoint must start with http:// or https://");
        }

        if self.api.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if !POLL_PERIOD_RANGE_SECS.contains(&self.monitor.poll_period_secs) {
            anyhow::bail!(
                "poll_period_secs must be between {} and {}",
                POLL_PERIOD_RANGE_SECS.start(),
                POLL_PERIOD_RANGE_SECS.end()
            );
        }

        if self.monitor.backoff_period_secs == Some(0) {
            anyhow::bail!("backoff_period_secs must be greater than 0");
        }

        if self.monitor.display_limit == 0 {
            anyhow::bail!("display_limit must be greater than 0");
        }

        if self.monitor.publish_to.is_empty() {
            anyhow::bail!("publish_to must name at least one publisher");
        }

        Ok(())
    }
}

impl ApiConfig {
    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl MonitorConfig {
    /// Delay after a cycle without publishable slots
    #[must_use]
    pub fn poll_period(&self) -> Duration {
        Duration::from_secs(self.poll_period_secs)
    }

    /// Delay after a cycle that published slots
    #[must_use]
    pub fn backoff_period(&self) -> Duration {
        Duration::from_secs(self.backoff_period_secs.unwrap_or(self.poll_period_secs))
    }

    /// Effective cutoff; unset means every active slot is eligible
    #[must_use]
    pub fn cutoff(&self) -> NaiveDateTime {
        self.before.unwrap_or(NaiveDateTime::MAX)
    }
}

/// Parse a comma separated list of location ids
pub fn parse_location_ids(value: &str) -> Result<Vec<u32>> {
    split_list(value)
        .iter()
        .map(|id| {
            id.parse::<u32>()
                .with_context(|| format!("Invalid location id '{id}'"))
        })
        .collect()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
