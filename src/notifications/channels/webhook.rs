//! Webhook notification channel
//!
//! This module provides a webhook channel for sending messages via HTTP POST requests.

use async_trait::async_trait;
use reqwest::Client;

use super::{Channel, ChannelError, ChannelResult};
use crate::utils::{extract_domain, truncate_text};

/// JSON field used when the selection does not name one
pub const DEFAULT_MESSAGE_FIELD: &str = "Content";

/// Destination parsed from a webhook selection payload
///
/// Payload grammar: `url` or `url|fieldName`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookTarget {
    /// Webhook URL endpoint
    pub url: String,
    /// JSON field carrying the message
    pub field: String,
}

impl WebhookTarget {
    /// Parse a selection payload
    pub fn parse(payload: &str) -> ChannelResult<Self> {
        let (url, field) = match payload.split_once('|') {
            Some((url, field)) => (url.trim(), field.trim()),
            None => (payload.trim(), ""),
        };

        let target = Self {
            url: url.to_string(),
            field: if field.is_empty() {
                DEFAULT_MESSAGE_FIELD.to_string()
            } else {
                field.to_string()
            },
        };

        target.validate().map_err(ChannelError::InvalidConfig)?;
        Ok(target)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.url.is_empty() {
            return Err("Webhook URL cannot be empty".to_string());
        }

        // Basic URL validation
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err("Webhook URL must start with http:// or https://".to_string());
        }

        Ok(())
    }

    /// Host of the webhook, safe to log (paths usually embed secrets)
    pub fn display_host(&self) -> String {
        extract_domain(&self.url).unwrap_or_else(|_| "<invalid url>".to_string())
    }

    /// Build the webhook body: `{ <field>: message }`
    pub fn build_payload(&self, message: &str) -> serde_json::Value {
        let mut body = serde_json::Map::new();
        body.insert(
            self.field.clone(),
            serde_json::Value::String(message.to_string()),
        );
        serde_json::Value::Object(body)
    }
}

/// Webhook notification channel
///
/// Sends `{"Content": "<message>"}` (or the field named in the selection) as
/// a JSON POST. Works with Slack and Chime workflow webhooks:
///
/// ```text
/// Webhook=https://hooks.slack.com/workflows/T012/A01/123
/// Webhook=https://hooks.slack.com/workflows/T012/A01/123|msg
/// ```
pub struct WebhookChannel {
    client: Client,
}

impl WebhookChannel {
    /// Create a new webhook channel sharing `client`
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Channel for WebhookChannel {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn publish(&self, payload: &str, message: &str) -> ChannelResult<()> {
        let target = WebhookTarget::parse(payload)?;
        let body = target.build_payload(message);

        let response = self.client.post(&target.url).json(&body).send().await?;
        let status = response.status();

        if status.is_success() {
            tracing::debug!(
                host = %target.display_host(),
                status = %status,
                "Webhook delivered"
            );
            return Ok(());
        }

        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response body".to_string());

        tracing::debug!(
            host = %target.display_host(),
            status = %status,
            "Webhook rejected the message"
        );

        Err(ChannelError::Rejected {
            status: status.as_u16(),
            body: truncate_text(&text, 200),
        })
    }
}
