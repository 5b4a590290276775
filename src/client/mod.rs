//! Scheduling API client
//!
//! Thin typed wrapper over the Trusted Traveler Programs scheduler API:
//!
//! - `GET {endpoint}/locations/` - every enrollment location
//! - `GET {endpoint}/slot-availability/?locationId={id}` - slots for one location
//!
//! Each call issues exactly one request. Retries are not performed here; a
//! failed call surfaces as a [`FetchError`] and the caller decides what to do
//! with it (the monitor treats it as "no slots" for the current cycle).

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::ApiConfig;
use crate::models::{Location, SlotAvailability};
use crate::utils::error::FetchError;
use crate::utils::truncate_text;

/// Production endpoint of the scheduling API
pub const DEFAULT_ENDPOINT: &str = "https://ttp.cbp.dhs.gov/schedulerapi";

/// Maximum number of body characters kept in decode errors
const BODY_SNIPPET_LEN: usize = 200;

// ============================================================================
// Client Configuration
// ============================================================================

/// Configuration for the scheduling API client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL, without trailing slash
    pub endpoint: String,

    /// Request timeout applied by the transport
    pub timeout: Duration,

    /// User agent sent with every request
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a new client config
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("appointment-monitor/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl From<&ApiConfig> for ClientConfig {
    fn from(api: &ApiConfig) -> Self {
        Self::new(&api.endpoint)
            .with_timeout(api.request_timeout())
            .with_user_agent(&api.user_agent)
    }
}

// ============================================================================
// Slot Source
// ============================================================================

/// Anything that can report slot availability for a location
///
/// The monitor depends on this trait rather than on [`TtpClient`] directly.
#[async_trait]
pub trait SlotSource: Send + Sync {
    /// Fetch the current availability for one location
    async fn fetch_slot_availability(&self, location_id: u32)
        -> Result<SlotAvailability, FetchError>;
}

// ============================================================================
// TTP Client
// ============================================================================

/// Client for the scheduling API
///
/// Cheap to clone; the underlying `reqwest::Client` is shared.
#[derive(Debug, Clone)]
pub struct TtpClient {
    config: ClientConfig,
    http_client: Client,
}

impl TtpClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        if !config.endpoint.starts_with("http://") && !config.endpoint.starts_with("https://") {
            return Err(FetchError::InvalidUrl(config.endpoint));
        }

        let http_client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Create a client against a custom base URL (mock servers in tests)
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` if the URL has no http(s) scheme
    pub fn with_base_url(base_url: &str) -> Result<Self, FetchError> {
        Self::new(ClientConfig::new(base_url))
    }

    /// Get the configured endpoint
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Share the underlying HTTP client (publishers reuse it)
    pub fn http_client(&self) -> Client {
        self.http_client.clone()
    }

    /// Fetch every known enrollment location
    pub async fn fetch_locations(&self) -> Result<Vec<Location>, FetchError> {
        self.get("locations", &[]).await
    }

    /// Fetch locations whose name, short name or city contains `query`
    pub async fn search_locations(&self, query: &str) -> Result<Vec<Location>, FetchError> {
        let mut locations: Vec<Location> = self
            .fetch_locations()
            .await?
            .into_iter()
            .filter(|location| location.matches(query))
            .collect();

        locations.sort_by_key(|location| location.id);
        Ok(locations)
    }

    // Internal: single GET with JSON decoding
    async fn get<T: DeserializeOwned>(
        &self,
        api: &str,
        params: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}/{api}/", self.config.endpoint);

        let response = self
            .http_client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(url = %url, params = ?params, error = %e, "Request failed");
                if e.is_timeout() {
                    FetchError::Timeout(url.clone())
                } else {
                    FetchError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(url = %url, params = ?params, status = %status, "Request rejected");
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(url.clone())
            } else {
                FetchError::Http(e)
            }
        })?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                url = %url,
                params = ?params,
                error = %e,
                body = %truncate_text(&body, BODY_SNIPPET_LEN),
                "Failed to decode response"
            );
            FetchError::Decode {
                url,
                reason: e.to_string(),
                snippet: truncate_text(&body, BODY_SNIPPET_LEN),
            }
        })
    }
}

#[async_trait]
impl SlotSource for TtpClient {
    async fn fetch_slot_availability(
        &self,
        location_id: u32,
    ) -> Result<SlotAvailability, FetchError> {
        self.get(
            "slot-availability",
            &[("locationId", location_id.to_string())],
        )
        .await
    }
}

// ============================================================================
// Tests
// ============================================================================
