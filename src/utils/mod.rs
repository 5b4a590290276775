//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use url::Url;

/// Canonical rendering for local timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Accepted input layouts for local timestamps, most precise first
const TIMESTAMP_INPUT_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse an ISO-8601 local date-time, with or without seconds
///
/// The scheduling API emits `2024-05-01T08:00`, operators usually type
/// `2024-05-01T08:00:00`; both are accepted.
pub fn parse_local_timestamp(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();

    TIMESTAMP_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .with_context(|| {
            format!("Invalid local date-time '{value}', expected e.g. 2024-05-01T08:25:30")
        })
}

/// Extract domain from URL
pub fn extract_domain(url: &str) -> Result<String> {
    let parsed = Url::parse(url).context("Invalid URL")?;

    parsed
        .host_str()
        .map(|s| s.to_string())
        .context("No host in URL")
}

/// Truncate text to a maximum length
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_len.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_local_timestamp_with_seconds() {
        let ts = parse_local_timestamp("2024-05-01T08:25:30").unwrap();
        assert_eq!(
            ts,
            NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(8, 25, 30)
                .unwrap()
        );
    }

    #[test]
    fn test_parse_local_timestamp_without_seconds() {
        let ts = parse_local_timestamp(" 2024-05-01T08:25 ").unwrap();
        assert_eq!(ts.format(TIMESTAMP_FORMAT).to_string(), "2024-05-01T08:25:00");
    }

    #[test]
    fn test_parse_local_timestamp_rejects_garbage() {
        assert!(parse_local_timestamp("tomorrow").is_err());
        assert!(parse_local_timestamp("2024-05-01").is_err());
    }

    #[test]
    fn test_extract_domain() {
        let domain = extract_domain("https://hooks.slack.com/workflows/T012/A01/123");
        assert_eq!(domain.unwrap(), "hooks.slack.com");
        assert!(extract_domain("not a url").is_err());
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("very long text here", 10), "very lo...");
    }
}
