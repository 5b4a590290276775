//! Publisher dispatch
//!
//! Routes a formatted slot message to the sinks the operator selected.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │      PublisherRegistry                     │
//! │  - Selection parsing (Name[=payload])      │
//! │  - Case-insensitive sink lookup            │
//! │  - Concurrent best-effort delivery         │
//! └────────────────────────────────────────────┘
//!                     │
//!         ┌───────────┼───────────┐
//!         ▼           ▼           ▼
//!   ┌─────────┐ ┌─────────┐ ┌──────────┐
//!   │   Log   │ │ Webhook │ │ Pushover │
//!   │ Channel │ │ Channel │ │ Channel  │
//!   └─────────┘ └─────────┘ └──────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use appointment_monitor::notifications::PublisherRegistry;
//!
//! let registry = PublisherRegistry::standard(reqwest::Client::new(), &config.publishers);
//! let selections = vec![
//!     "Log".to_string(),
//!     "Webhook=https://hooks.example.com/x|text".to_string(),
//! ];
//!
//! for status in registry.dispatch(&selections, "Found 1 slot at SFO (5446) ...").await {
//!     println!("{status}");
//! }
//! ```

pub mod channels;

use futures::future::join_all;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::PublisherConfig;
use crate::error::{Error, MonitorErrorTrait};

// Re-exports
pub use channels::log::LogChannel;
pub use channels::pushover::PushoverChannel;
pub use channels::webhook::WebhookChannel;
pub use channels::{Channel, ChannelError, ChannelResult, DeliveryStatus, SinkKind};

/// One operator selection: `Name` or `Name=payload`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    /// Sink name as typed by the operator
    pub name: String,
    /// Everything after the first `=`, empty when absent
    pub payload: String,
}

impl PublishRequest {
    /// Split a selection once on `=`
    pub fn parse(selection: &str) -> Self {
        match selection.split_once('=') {
            Some((name, payload)) => Self {
                name: name.trim().to_string(),
                payload: payload.to_string(),
            },
            None => Self {
                name: selection.trim().to_string(),
                payload: String::new(),
            },
        }
    }

    /// Lookup key used by the registry
    fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

impl SinkKind {
    /// Construct the built-in sink for this kind
    pub fn build(&self, client: &Client, config: &PublisherConfig) -> Arc<dyn Channel> {
        match self {
            Self::Log => Arc::new(LogChannel::new()),
            Self::Webhook => Arc::new(WebhookChannel::new(client.clone())),
            Self::Pushover => Arc::new(
                PushoverChannel::new(client.clone(), config.pushover_app_token.clone())
                    .with_endpoint(config.pushover_endpoint.clone()),
            ),
        }
    }
}

/// Name-to-sink table, built once at startup and read-only afterwards
#[derive(Default, Clone)]
pub struct PublisherRegistry {
    sinks: HashMap<String, Arc<dyn Channel>>,
}

impl PublisherRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in sink
    pub fn standard(client: Client, config: &PublisherConfig) -> Self {
        let mut registry = Self::new();
        for kind in SinkKind::ALL {
            registry.register(kind.as_str(), kind.build(&client, config));
        }
        registry
    }

    /// Add or replace a sink under a case-insensitive name
    pub fn register(&mut self, name: &str, channel: Arc<dyn Channel>) {
        self.sinks.insert(name.trim().to_lowercase(), channel);
    }

    /// Look up a sink by case-insensitive name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Channel>> {
        self.sinks.get(&name.trim().to_lowercase())
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sinks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Selections whose sink name is not registered
    pub fn unknown_selections<'a>(&self, selections: &'a [String]) -> Vec<&'a str> {
        selections
            .iter()
            .filter(|s| self.get(&PublishRequest::parse(s).name).is_none())
            .map(String::as_str)
            .collect()
    }

    /// Deliver `message` to every selected sink
    ///
    /// Sinks run concurrently; a failing sink is logged and reported in its
    /// `DeliveryStatus` without affecting the others. Unknown sink names are
    /// skipped with a warning. Statuses follow selection order.
    pub async fn dispatch(&self, selections: &[String], message: &str) -> Vec<DeliveryStatus> {
        let deliveries = selections.iter().filter_map(|selection| {
            let request = PublishRequest::parse(selection);

            let Some(channel) = self.sinks.get(&request.key()).cloned() else {
                tracing::warn!(
                    publisher = %request.name,
                    known = ?self.names(),
                    "Skipping unknown publisher"
                );
                return None;
            };

            Some(async move {
                match channel.publish(&request.payload, message).await {
                    Ok(()) => DeliveryStatus::success(channel.name()),
                    Err(e) => {
                        let error = Error::from(e);
                        tracing::warn!(
                            publisher = %channel.name(),
                            category = %error.category(),
                            error = %error,
                            "Failed to publish message"
                        );
                        DeliveryStatus::failure(channel.name(), error.to_string())
                    }
                }
            })
        });

        join_all(deliveries).await
    }
}

impl std::fmt::Debug for PublisherRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublisherRegistry")
            .field("sinks", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    /// Records every publish call; optionally fails
    struct RecordingChannel {
        name: &'static str,
        fail: bool,
        latency: Duration,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl RecordingChannel {
        fn new(name: &'static str, fail: bool) -> Arc<Self> {
            Self::slow(name, fail, Duration::ZERO)
        }

        fn slow(name: &'static str, fail: bool, latency: Duration) -> Arc<Self> {
            Arc::new(Self {
                name,
                fail,
                latency,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Channel for RecordingChannel {
        fn name(&self) -> &str {
            self.name
        }

        async fn publish(&self, payload: &str, message: &str) -> ChannelResult<()> {
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            self.calls
                .lock()
                .unwrap()
                .push((payload.to_string(), message.to_string()));
            if self.fail {
                Err(ChannelError::Rejected {
                    status: 500,
                    body: "boom".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_publish_request_parse() {
        assert_eq!(
            PublishRequest::parse("Log"),
            PublishRequest {
                name: "Log".to_string(),
                payload: String::new()
            }
        );

        let request = PublishRequest::parse("Pushover=user|title=a=b");
        assert_eq!(request.name, "Pushover");
        assert_eq!(request.payload, "user|title=a=b");
    }

    #[test]
    fn test_standard_registry_names() {
        let registry = PublisherRegistry::standard(Client::new(), &PublisherConfig::default());
        assert_eq!(registry.names(), vec!["log", "pushover", "webhook"]);
        assert!(registry.get("LOG").is_some());
    }

    #[test]
    fn test_unknown_selections() {
        let registry = PublisherRegistry::standard(Client::new(), &PublisherConfig::default());
        let selections = vec![
            "log".to_string(),
            "Slack=https://x".to_string(),
            "Webhook=https://x".to_string(),
        ];
        assert_eq!(
            registry.unknown_selections(&selections),
            vec!["Slack=https://x"]
        );
    }

    #[tokio::test]
    async fn test_dispatch_routes_payloads() {
        let webhook = RecordingChannel::new("webhook", false);
        let log = RecordingChannel::new("log", false);

        let mut registry = PublisherRegistry::new();
        registry.register("Webhook", webhook.clone());
        registry.register("Log", log.clone());

        let selections = vec!["Webhook=https://x/y|msg".to_string(), "Log".to_string()];
        let statuses = registry.dispatch(&selections, "hello").await;

        assert_eq!(statuses.len(), 2);
        assert_eq!(
            webhook.calls(),
            vec![("https://x/y|msg".to_string(), "hello".to_string())]
        );
        assert_eq!(log.calls(), vec![(String::new(), "hello".to_string())]);
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_isolated() {
        let webhook = RecordingChannel::new("webhook", true);
        let log = RecordingChannel::new("log", false);

        let mut registry = PublisherRegistry::new();
        registry.register("webhook", webhook.clone());
        registry.register("log", log.clone());

        let selections = vec!["Webhook=https://x/y".to_string(), "Log".to_string()];
        let statuses = registry.dispatch(&selections, "hello").await;

        assert!(!statuses[0].success);
        assert!(statuses[1].success);
        assert_eq!(log.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_skips_unknown_and_matches_case_insensitively() {
        let log = RecordingChannel::new("log", false);

        let mut registry = PublisherRegistry::new();
        registry.register("Log", log.clone());

        let selections = vec!["Carrier-Pigeon=coo".to_string(), "LOG".to_string()];
        let statuses = registry.dispatch(&selections, "hello").await;

        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].channel, "log");
        assert_eq!(log.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_runs_sinks_concurrently() {
        let first = RecordingChannel::slow("first", false, Duration::from_millis(200));
        let second = RecordingChannel::slow("second", true, Duration::from_millis(200));

        let mut registry = PublisherRegistry::new();
        registry.register("first", first.clone());
        registry.register("second", second.clone());

        let selections = vec!["first".to_string(), "second".to_string()];
        let started = Instant::now();
        let statuses = registry.dispatch(&selections, "hello").await;
        let elapsed = started.elapsed();

        assert!(statuses[0].success);
        assert!(!statuses[1].success);
        assert!(statuses[1]
            .message
            .as_deref()
            .unwrap_or_default()
            .starts_with("Publish error: "));
        assert!(elapsed < Duration::from_millis(350), "took {elapsed:?}");
    }
}
