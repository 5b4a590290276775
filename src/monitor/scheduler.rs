//! Poll scheduler
//!
//! Drives the polling loop: one cycle checks every monitored location
//! concurrently, publishes eligible slots, then sleeps for either the poll
//! period or the backoff period depending on whether anything was published.
//!
//! Cancellation is cooperative. The loop takes a `watch::Receiver<bool>`; it is
//! checked at the top of every cycle and before each location check, and it
//! wakes the inter-cycle sleep. A location check that already started always
//! runs to completion, including its dispatches.

use chrono::NaiveDateTime;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use super::classifier::classify;
use super::formatter::SlotFormatter;
use crate::client::SlotSource;
use crate::config::MonitorConfig;
use crate::error::{Error, MonitorErrorTrait};
use crate::models::Location;
use crate::notifications::{DeliveryStatus, PublisherRegistry};

/// Slot-free locations tolerated before the cycle logs an aggregated
/// "no slots" line at info level
pub const NO_SLOTS_LOG_THRESHOLD: usize = 1;

// ============================================================================
// Settings
// ============================================================================

/// Runtime settings of the polling loop
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// Delay after a cycle without publishable slots
    pub poll_period: Duration,

    /// Delay after a cycle that published slots
    pub backoff_period: Duration,

    /// Slots must start strictly before this instant to be published
    pub cutoff: NaiveDateTime,

    /// Publisher selections (`Name[=payload]`)
    pub publish_to: Vec<String>,

    /// Message formatter
    pub formatter: SlotFormatter,
}

impl MonitorSettings {
    /// Create settings with the backoff equal to the poll period, no cutoff
    /// and the log publisher
    pub fn new(poll_period: Duration) -> Self {
        Self {
            poll_period,
            backoff_period: poll_period,
            cutoff: NaiveDateTime::MAX,
            publish_to: vec!["Log".to_string()],
            formatter: SlotFormatter::default(),
        }
    }

    /// Build settings from configuration
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self {
            poll_period: config.poll_period(),
            backoff_period: config.backoff_period(),
            cutoff: config.cutoff(),
            publish_to: config.publish_to.clone(),
            formatter: SlotFormatter::new(config.display_limit),
        }
    }

    /// Set backoff period
    pub fn with_backoff(mut self, backoff_period: Duration) -> Self {
        self.backoff_period = backoff_period;
        self
    }

    /// Set cutoff
    pub fn with_cutoff(mut self, cutoff: NaiveDateTime) -> Self {
        self.cutoff = cutoff;
        self
    }

    /// Set publisher selections
    pub fn with_publish_to(mut self, publish_to: Vec<String>) -> Self {
        self.publish_to = publish_to;
        self
    }
}

// ============================================================================
// Cycle Results
// ============================================================================

/// What happened to one location during one cycle
#[derive(Debug, Clone)]
pub enum CheckResult {
    /// Eligible slots were found and dispatched
    Published {
        eligible: usize,
        deliveries: Vec<DeliveryStatus>,
    },
    /// The response held nothing publishable
    NoEligible { inactive: usize, ineligible: usize },
    /// Fetching or decoding failed; treated as slot-free
    Failed { error: String },
    /// Not checked because shutdown was requested
    Skipped,
}

/// Outcome for one location in one cycle
#[derive(Debug, Clone)]
pub struct LocationOutcome {
    pub location_id: u32,
    pub label: String,
    pub result: CheckResult,
}

impl LocationOutcome {
    /// Whether eligible slots were found (and published)
    pub fn found(&self) -> bool {
        matches!(self.result, CheckResult::Published { .. })
    }
}

/// Aggregated result of one cycle
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub outcomes: Vec<LocationOutcome>,
}

impl CycleReport {
    /// Whether any location yielded eligible slots
    pub fn found_any(&self) -> bool {
        self.outcomes.iter().any(LocationOutcome::found)
    }

    /// Labels of checked locations that produced nothing publishable
    pub fn slot_free_labels(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !o.found() && !matches!(o.result, CheckResult::Skipped))
            .map(|o| o.label.as_str())
            .collect()
    }

    /// Aggregated info-level "no slots" line
    ///
    /// `None` unless more than `NO_SLOTS_LOG_THRESHOLD` checked locations came
    /// up empty; failed checks count as empty, skipped ones do not.
    pub fn no_slots_summary(&self) -> Option<String> {
        let slot_free = self.slot_free_labels();
        (slot_free.len() > NO_SLOTS_LOG_THRESHOLD)
            .then(|| format!("No slots found for {}", slot_free.join(", ")))
    }

    /// Whether any location was skipped because of shutdown
    pub fn interrupted(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| matches!(o.result, CheckResult::Skipped))
    }
}

// ============================================================================
// Delay Selection
// ============================================================================

/// Loop state driving the next sleep duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DelayState {
    /// Nothing was published last cycle
    #[default]
    Polling,
    /// Something was published last cycle
    BackingOff,
}

impl DelayState {
    /// State after the given cycle
    pub fn after(report: &CycleReport) -> Self {
        if report.found_any() {
            Self::BackingOff
        } else {
            Self::Polling
        }
    }

    /// Sleep duration for this state
    pub fn delay(&self, settings: &MonitorSettings) -> Duration {
        match self {
            Self::Polling => settings.poll_period,
            Self::BackingOff => settings.backoff_period,
        }
    }
}

// ============================================================================
// Monitor
// ============================================================================

/// Polls slot availability and publishes eligible slots
pub struct Monitor {
    source: Arc<dyn SlotSource>,
    publishers: Arc<PublisherRegistry>,
    settings: MonitorSettings,
}

impl Monitor {
    /// Create a new monitor
    pub fn new(
        source: Arc<dyn SlotSource>,
        publishers: Arc<PublisherRegistry>,
        settings: MonitorSettings,
    ) -> Self {
        Self {
            source,
            publishers,
            settings,
        }
    }

    /// Get the settings
    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    /// Run cycles until `shutdown` turns true; returns the number of cycles run
    pub async fn run(&self, locations: &[Location], mut shutdown: watch::Receiver<bool>) -> u64 {
        let labels: Vec<String> = locations.iter().map(Location::label).collect();
        tracing::info!(
            locations = ?labels,
            poll_period = ?self.settings.poll_period,
            backoff_period = ?self.settings.backoff_period,
            publish_to = ?self.settings.publish_to,
            "Starting appointment monitor"
        );

        let mut cycles = 0_u64;

        loop {
            if *shutdown.borrow() {
                break;
            }

            let report = self.run_cycle(locations, &shutdown).await;
            cycles += 1;

            if report.interrupted() || *shutdown.borrow() {
                break;
            }

            let state = DelayState::after(&report);
            let delay = state.delay(&self.settings);
            tracing::info!(state = ?state, "Sleeping for {:?} before checking again...", delay);

            if wait_or_shutdown(delay, &mut shutdown).await {
                break;
            }
        }

        tracing::info!(cycles, "Exiting!");
        cycles
    }

    /// Check every location once, concurrently
    pub async fn run_cycle(
        &self,
        locations: &[Location],
        shutdown: &watch::Receiver<bool>,
    ) -> CycleReport {
        let checks = locations
            .iter()
            .map(|location| self.check_location(location, shutdown));

        let report = CycleReport {
            outcomes: join_all(checks).await,
        };

        match report.no_slots_summary() {
            Some(summary) => tracing::info!("{summary}"),
            None => {
                let slot_free = report.slot_free_labels();
                if !slot_free.is_empty() {
                    tracing::debug!("No slots found for {}", slot_free.join(", "));
                }
            }
        }

        tracing::debug!(
            checked = report.outcomes.len(),
            found = report.found_any(),
            "Cycle complete"
        );

        report
    }

    async fn check_location(
        &self,
        location: &Location,
        shutdown: &watch::Receiver<bool>,
    ) -> LocationOutcome {
        let label = location.label();

        if *shutdown.borrow() {
            return LocationOutcome {
                location_id: location.id,
                label,
                result: CheckResult::Skipped,
            };
        }

        let result = match self.source.fetch_slot_availability(location.id).await {
            Ok(availability) => {
                tracing::debug!(
                    location_id = location.id,
                    slots = availability.available_slots.len(),
                    last_published = ?availability.last_published_date,
                    "Slot availability retrieved"
                );

                let classification = classify(availability.available_slots, self.settings.cutoff);

                if !classification.ineligible.is_empty() {
                    tracing::info!(
                        location = %label,
                        count = classification.ineligible.len(),
                        before = %self.settings.cutoff,
                        "Slots available, but after requested date"
                    );
                }

                if classification.has_eligible() {
                    let times = classification.eligible_start_times();
                    let message = self.settings.formatter.format(&times, &label);
                    let deliveries = self
                        .publishers
                        .dispatch(&self.settings.publish_to, &message)
                        .await;

                    let summary: Vec<String> = deliveries.iter().map(ToString::to_string).collect();
                    tracing::debug!(
                        location = %label,
                        deliveries = %summary.join("; "),
                        "Dispatch complete"
                    );

                    CheckResult::Published {
                        eligible: times.len(),
                        deliveries,
                    }
                } else {
                    CheckResult::NoEligible {
                        inactive: classification.inactive.len(),
                        ineligible: classification.ineligible.len(),
                    }
                }
            }
            Err(e) => {
                let error = Error::from(e);
                if error.is_recoverable() {
                    tracing::warn!(
                        location_id = location.id,
                        location = %label,
                        category = %error.category(),
                        error = %error,
                        "Failed to check slot availability"
                    );
                } else {
                    tracing::error!(
                        location_id = location.id,
                        location = %label,
                        category = %error.category(),
                        error = %error,
                        "Slot availability check failed and will likely keep failing"
                    );
                }
                CheckResult::Failed {
                    error: error.to_string(),
                }
            }
        };

        LocationOutcome {
            location_id: location.id,
            label,
            result,
        }
    }
}

/// Sleep for `delay`; returns true if shutdown was requested meanwhile
async fn wait_or_shutdown(delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return false,
            changed = shutdown.changed() => match changed {
                Ok(()) if *shutdown.borrow_and_update() => return true,
                Ok(()) => continue,
                Err(_) => {
                    // Sender gone: nobody can request shutdown any more
                    (&mut sleep).await;
                    return false;
                }
            },
        }
    }
}
