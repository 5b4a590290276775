//! Slot monitoring
//!
//! The polling core, built from four small pieces:
//!
//! - [`resolver`] - validates requested location ids against the API's list
//! - [`classifier`] - splits a location's slots into inactive, ineligible and eligible
//! - [`formatter`] - renders eligible start times into one human-readable line
//! - [`scheduler`] - runs cycles, dispatches messages and picks the next delay
//!
//! # Example
//!
//! ```rust,ignore
//! use appointment_monitor::client::TtpClient;
//! use appointment_monitor::monitor::{resolve, Monitor, MonitorSettings};
//! use appointment_monitor::notifications::PublisherRegistry;
//! use std::sync::Arc;
//!
//! let client = TtpClient::new(Default::default())?;
//! let locations = resolve([5140, 5446], &client.fetch_locations().await?)?;
//! let registry = PublisherRegistry::standard(client.http_client(), &config.publishers);
//!
//! let monitor = Monitor::new(
//!     Arc::new(client),
//!     Arc::new(registry),
//!     MonitorSettings::from_config(&config.monitor),
//! );
//! let (_tx, rx) = tokio::sync::watch::channel(false);
//! monitor.run(&locations, rx).await;
//! ```

pub mod classifier;
pub mod formatter;
pub mod resolver;
pub mod scheduler;

pub use classifier::{classify, SlotClassification};
pub use formatter::{SlotFormatter, DEFAULT_DISPLAY_LIMIT};
pub use resolver::{resolve, resolve_remote};
pub use scheduler::{
    CheckResult, CycleReport, DelayState, LocationOutcome, Monitor, MonitorSettings,
    NO_SLOTS_LOG_THRESHOLD,
};
