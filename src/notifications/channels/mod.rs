//! Notification channels for delivering slot messages
//!
//! Every sink implements [`Channel`]. The built-in sinks are enumerated by
//! [`SinkKind`]; the name table mapping operator input to a sink is built
//! once at startup from that enum.

pub mod log;
pub mod pushover;
pub mod webhook;

use async_trait::async_trait;
use std::fmt;

/// Result type for channel operations
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Errors that can occur during channel operations
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invalid channel configuration or selection payload
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Remote end answered with a non-success status
    #[error("Rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Outcome of handing one message to one sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryStatus {
    /// Whether the sink accepted the message
    pub success: bool,
    /// Name of the sink
    pub channel: String,
    /// Failure detail
    pub message: Option<String>,
}

impl DeliveryStatus {
    /// Create a successful delivery status
    pub fn success(channel: impl Into<String>) -> Self {
        Self {
            success: true,
            channel: channel.into(),
            message: None,
        }
    }

    /// Create a failed delivery status
    pub fn failure(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            channel: channel.into(),
            message: Some(message.into()),
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.success { "SUCCESS" } else { "FAILED" };
        write!(f, "[{status}] {}", self.channel)?;
        if let Some(msg) = &self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

/// Trait for notification channels
///
/// `payload` is the sink-specific suffix of the operator's selection string
/// (the part after `=`), empty when the selection had none.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Get the channel name
    fn name(&self) -> &str;

    /// Publish `message` using the selection `payload`
    async fn publish(&self, payload: &str, message: &str) -> ChannelResult<()>;
}

/// Built-in sinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinkKind {
    /// Operational log
    Log,
    /// JSON POST to an arbitrary URL (Slack, Chime, ...)
    Webhook,
    /// Pushover push notifications
    Pushover,
}

impl SinkKind {
    /// Every built-in sink
    pub const ALL: [SinkKind; 3] = [Self::Log, Self::Webhook, Self::Pushover];

    /// Canonical name used in selection strings
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Log => "Log",
            Self::Webhook => "Webhook",
            Self::Pushover => "Pushover",
        }
    }

    /// Case-insensitive lookup by selection name
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
