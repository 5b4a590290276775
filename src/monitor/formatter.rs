//! Notification message formatting

use chrono::NaiveDateTime;

/// Timestamps listed before the message elides to the last one
pub const DEFAULT_DISPLAY_LIMIT: usize = 3;

/// Rendering used for slot start times in messages
const MESSAGE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Builds one human-readable message per location and cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotFormatter {
    display_limit: usize,
}

impl Default for SlotFormatter {
    fn default() -> Self {
        Self {
            display_limit: DEFAULT_DISPLAY_LIMIT,
        }
    }
}

impl SlotFormatter {
    /// Create a formatter listing at most `display_limit` leading timestamps
    ///
    /// A limit of zero is treated as one.
    pub fn new(display_limit: usize) -> Self {
        Self {
            display_limit: display_limit.max(1),
        }
    }

    /// Get the display limit
    pub fn display_limit(&self) -> usize {
        self.display_limit
    }

    /// Format eligible start times for one location
    ///
    /// Up to the limit, every timestamp is listed (`a, b and c`). Past the
    /// limit the first `limit` are listed and the last one of the full list is
    /// appended (`a, b, c ... and z`), so the reader sees the soonest slots
    /// and the final one.
    pub fn format(&self, timestamps: &[NaiveDateTime], location_label: &str) -> String {
        let count = timestamps.len();
        let noun = if count == 1 { "slot" } else { "slots" };

        let rendered: Vec<String> = timestamps
            .iter()
            .map(|ts| ts.format(MESSAGE_TIMESTAMP_FORMAT).to_string())
            .collect();

        let listing = match rendered.as_slice() {
            [] => return format!("Found 0 slots at {location_label}."),
            [only] => only.clone(),
            all if all.len() <= self.display_limit => {
                let head = &all[..all.len() - 1];
                format!("{} and {}", head.join(", "), all[all.len() - 1])
            }
            all => {
                let shown = all[..self.display_limit].join(", ");
                let last = &all[all.len() - 1];
                format!("{shown} ... and {last}")
            }
        };

        format!("Found {count} {noun} at {location_label} starting at {listing}.")
    }
}
