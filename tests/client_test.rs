//! Integration tests for TtpClient using wiremock
//!
//! These tests validate the scheduling API client against mock servers.

mod common;

use appointment_monitor::client::{ClientConfig, SlotSource, TtpClient};
use appointment_monitor::utils::error::FetchError;
use chrono::NaiveDate;
use common::{availability_json, location_json, slot_json};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test that the location list decodes and ignores unknown fields
#[tokio::test]
async fn test_fetch_locations() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/locations/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            location_json(5446, "SFO", "San Francisco"),
            location_json(5140, "JFK", "Jamaica"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = TtpClient::with_base_url(&mock_server.uri()).unwrap();
    let locations = client.fetch_locations().await.unwrap();

    assert_eq!(locations.len(), 2);
    assert_eq!(locations[0].id, 5446);
    assert_eq!(locations[0].label(), "SFO (5446)");
    assert_eq!(locations[0].services[0].name, "Global Entry");
}

/// Test that searching filters case-insensitively and sorts by id
#[tokio::test]
async fn test_search_locations() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/locations/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            location_json(5446, "SFO", "San Francisco"),
            location_json(5140, "JFK", "Jamaica"),
            location_json(5001, "SFO Downtown", "San Francisco"),
        ])))
        .mount(&mock_server)
        .await;

    let client = TtpClient::with_base_url(&mock_server.uri()).unwrap();
    let found = client.search_locations("san fran").await.unwrap();

    let ids: Vec<u32> = found.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![5001, 5446]);
}

/// Test slot availability request shape and decoding
#[tokio::test]
async fn test_fetch_slot_availability() {
    let mock_server = MockServer::start().await;
    let start = NaiveDate::from_ymd_opt(2024, 5, 2)
        .unwrap()
        .and_hms_opt(8, 30, 0)
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/slot-availability/"))
        .and(query_param("locationId", "5446"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(availability_json(vec![slot_json(5446, start, true)])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = TtpClient::with_base_url(&mock_server.uri()).unwrap();
    let availability = client.fetch_slot_availability(5446).await.unwrap();

    assert_eq!(availability.available_slots.len(), 1);
    assert_eq!(availability.available_slots[0].start_timestamp, start);
    assert!(availability.available_slots[0].active);
    assert!(availability.last_published_date.is_some());
}

/// Test that an empty object decodes to no slots
#[tokio::test]
async fn test_empty_availability() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slot-availability/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&mock_server)
        .await;

    let client = TtpClient::with_base_url(&mock_server.uri()).unwrap();
    let availability = client.fetch_slot_availability(1).await.unwrap();

    assert!(availability.available_slots.is_empty());
    assert!(availability.last_published_date.is_none());
}

/// Test that non-success statuses surface as FetchError::Status
#[tokio::test]
async fn test_server_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slot-availability/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = TtpClient::with_base_url(&mock_server.uri()).unwrap();
    let result = client.fetch_slot_availability(1).await;

    match result {
        Err(FetchError::Status { status, .. }) => assert_eq!(status, 503),
        other => panic!("expected status error, got {other:?}"),
    }
}

/// Test that malformed bodies surface as FetchError::Decode with a snippet
#[tokio::test]
async fn test_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slot-availability/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let client = TtpClient::with_base_url(&mock_server.uri()).unwrap();
    let result = client.fetch_slot_availability(1).await;

    match result {
        Err(FetchError::Decode { snippet, .. }) => assert!(snippet.contains("maintenance")),
        other => panic!("expected decode error, got {other:?}"),
    }
}

/// Test that slow responses hit the configured timeout
#[tokio::test]
async fn test_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slot-availability/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("{}")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let config = ClientConfig::new(mock_server.uri()).with_timeout(Duration::from_millis(200));
    let client = TtpClient::new(config).unwrap();
    let result = client.fetch_slot_availability(1).await;

    assert!(
        matches!(result, Err(FetchError::Timeout(_))),
        "expected timeout, got {result:?}"
    );
}

/// Test that endpoints without a scheme are rejected up front
#[test]
fn test_invalid_endpoint() {
    let result = TtpClient::with_base_url("ttp.cbp.dhs.gov/schedulerapi");
    assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
}
