//! Error types for the appointment monitor
//!
//! This module defines the custom error types raised while talking to the
//! scheduling API and while validating monitored locations.

use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status code
    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    /// Request timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Response body could not be decoded
    #[error("Decoding error for {url}: {reason} (body: {snippet})")]
    Decode {
        url: String,
        reason: String,
        snippet: String,
    },

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Check if this error is worth retrying on a later cycle
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Decode { .. } => true,
            Self::InvalidUrl(_) => false,
        }
    }
}

/// Errors raised while validating the monitored location set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Requested ids that the API does not know about, ascending
    #[error("Following location ids are not valid: {missing:?}")]
    LocationsNotFound { missing: Vec<u32> },

    /// Nothing to monitor
    #[error("No location ids were requested")]
    NoLocationsRequested,
}
