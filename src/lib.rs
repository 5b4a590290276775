//! appointment-monitor - Trusted Traveler appointment slot watcher
//!
//! Polls the public scheduling API for open appointment slots at a set of
//! enrollment locations and pushes a short message to the configured
//! publishers whenever a slot before the requested date shows up.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`client`] - Scheduling API client (locations, slot availability)
//! - [`monitor`] - Location resolution, slot classification, formatting and the poll loop
//! - [`notifications`] - Publisher registry and sinks (log, webhook, pushover)
//! - [`config`] - Configuration management and settings
//! - [`models`] - Wire data structures
//! - [`error`] - Unified error type
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use appointment_monitor::client::{ClientConfig, TtpClient};
//! use appointment_monitor::monitor::resolve;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = TtpClient::new(ClientConfig::default())?;
//!     let known = client.fetch_locations().await?;
//!     let locations = resolve([5140], &known)?;
//!     println!("{}", locations[0].label());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod monitor;
pub mod notifications;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::client::{ClientConfig, SlotSource, TtpClient};
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, MonitorErrorTrait, Result};
    pub use crate::models::{AvailableSlot, Location, SlotAvailability};
    pub use crate::monitor::{Monitor, MonitorSettings};
    pub use crate::notifications::{Channel, DeliveryStatus, PublisherRegistry};
}

// Direct re-exports for convenience
pub use models::{AvailableSlot, Location, SlotAvailability};
