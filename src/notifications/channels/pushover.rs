//! Pushover notification channel
//!
//! Selection payload: `userToken` or `userToken|key=value&key2=value2`. The
//! extra parameters are merged into the request body after the required
//! fields, so a colliding key (`message`, `user`, even `token`) wins.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};

use super::{Channel, ChannelError, ChannelResult};
use crate::utils::truncate_text;

/// Pushover messages API
pub const DEFAULT_PUSHOVER_ENDPOINT: &str = "https://api.pushover.net/1/messages.json";

/// Recipient and overrides parsed from a pushover selection payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushoverRequest {
    /// Pushover user (or group) key
    pub user: String,
    /// Extra API parameters, in input order
    pub params: Vec<(String, String)>,
}

impl PushoverRequest {
    /// Parse a selection payload
    ///
    /// Parameters without `=` are skipped with a warning.
    pub fn parse(payload: &str) -> ChannelResult<Self> {
        let (user, extra) = match payload.split_once('|') {
            Some((user, extra)) => (user.trim(), extra),
            None => (payload.trim(), ""),
        };

        if user.is_empty() {
            return Err(ChannelError::InvalidConfig(
                "Pushover selection needs a user token, e.g. Pushover=<user_token>".to_string(),
            ));
        }

        let params = extra
            .split('&')
            .filter(|pair| !pair.trim().is_empty())
            .filter_map(|pair| match pair.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    Some((key.trim().to_string(), value.trim().to_string()))
                }
                _ => {
                    tracing::warn!(param = %pair, "Ignoring malformed pushover parameter");
                    None
                }
            })
            .collect();

        Ok(Self {
            user: user.to_string(),
            params,
        })
    }
}

/// Pushover notification channel
///
/// The application token is supplied by configuration; without one every
/// publish fails with `ChannelError::InvalidConfig`.
pub struct PushoverChannel {
    client: Client,
    app_token: Option<String>,
    endpoint: String,
}

impl PushoverChannel {
    /// Create a new pushover channel
    pub fn new(client: Client, app_token: Option<String>) -> Self {
        Self {
            client,
            app_token,
            endpoint: DEFAULT_PUSHOVER_ENDPOINT.to_string(),
        }
    }

    /// Override the messages endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Get the messages endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the JSON body for one message
    fn build_body(&self, app_token: &str, request: &PushoverRequest, message: &str) -> Value {
        let mut body = Map::new();
        body.insert("token".to_string(), Value::String(app_token.to_string()));
        body.insert("user".to_string(), Value::String(request.user.clone()));
        body.insert("message".to_string(), Value::String(message.to_string()));

        for (key, value) in &request.params {
            body.insert(key.clone(), Value::String(value.clone()));
        }

        Value::Object(body)
    }
}

#[async_trait]
impl Channel for PushoverChannel {
    fn name(&self) -> &str {
        "pushover"
    }

    async fn publish(&self, payload: &str, message: &str) -> ChannelResult<()> {
        let app_token = self.app_token.as_deref().ok_or_else(|| {
            ChannelError::InvalidConfig(
                "Pushover application token is not configured (PUSHOVER_APP_TOKEN)".to_string(),
            )
        })?;

        let request = PushoverRequest::parse(payload)?;
        let body = self.build_body(app_token, &request, message);

        let response = self.client.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();

        if status.is_success() {
            tracing::debug!(status = %status, "Pushover notification delivered");
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        tracing::debug!(status = %status, "Pushover rejected the message");

        Err(ChannelError::Rejected {
            status: status.as_u16(),
            body: truncate_text(&text, 200),
        })
    }
}
