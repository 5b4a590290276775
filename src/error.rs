//! Unified error handling for the appointment monitor
//!
//! This module provides a unified error type that consolidates the
//! domain-specific errors into a single `Error` enum, while the domain errors
//! stay usable on their own inside each module.
//!
//! # Architecture
//!
//! - [`MonitorErrorTrait`] - Common interface implemented by the unified error
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use appointment_monitor::error::{Error, MonitorErrorTrait};
//!
//! fn handle_error(err: Error) {
//!     if err.is_recoverable() {
//!         tracing::warn!(category = %err.category(), "Will retry next cycle: {err}");
//!     } else {
//!         tracing::error!("Fatal error: {err}");
//!     }
//! }
//! ```

use std::fmt;
use thiserror::Error;

// Re-export domain-specific errors for convenience
pub use crate::notifications::ChannelError;
pub use crate::utils::error::{FetchError, ResolveError};

/// Common trait for appointment monitor error types
pub trait MonitorErrorTrait: std::error::Error {
    /// Check if this error may clear up on a later cycle
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout, status)
    Network,
    /// Configuration and validation errors
    Config,
    /// Sink delivery errors
    Publish,
    /// Decoding errors
    Parsing,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::Config => "config",
            Self::Publish => "publish",
            Self::Parsing => "parsing",
        };
        f.write_str(name)
    }
}

/// Unified error type for the appointment monitor
#[derive(Error, Debug)]
pub enum Error {
    /// Scheduling API errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Location validation errors
    #[error("{0}")]
    Resolve(#[from] ResolveError),

    /// Publisher errors
    #[error("Publish error: {0}")]
    Channel(#[from] ChannelError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),
}

impl MonitorErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Resolve(_) => false,
            Self::Channel(e) => matches!(
                e,
                ChannelError::HttpError(_) | ChannelError::Rejected { .. }
            ),
            Self::Config(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Fetch(FetchError::Decode { .. }) => ErrorCategory::Parsing,
            Self::Fetch(FetchError::InvalidUrl(_)) => ErrorCategory::Config,
            Self::Fetch(_) => ErrorCategory::Network,
            Self::Resolve(_) | Self::Config(_) => ErrorCategory::Config,
            Self::Channel(ChannelError::InvalidConfig(_)) => ErrorCategory::Config,
            Self::Channel(_) => ErrorCategory::Publish,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
