//! Common test utilities

use chrono::{Duration, Local, NaiveDateTime, Timelike};
use serde_json::{json, Value};

/// Location entry as returned by `/locations/`
#[allow(dead_code)]
pub fn location_json(id: u32, short_name: &str, city: &str) -> Value {
    json!({
        "id": id,
        "name": format!("{short_name} Enrollment Center"),
        "shortName": short_name,
        "locationType": "LND",
        "locationCode": "",
        "address": "1 Airport Way",
        "addressAdditional": "",
        "city": city,
        "state": "CA",
        "postalCode": "94128",
        "countryCode": "US",
        "tzData": "America/Los_Angeles",
        "phoneNumber": "",
        "temporary": false,
        "inviteOnly": false,
        "operational": true,
        "services": [{ "id": 2, "name": "Global Entry" }]
    })
}

/// Slot entry as returned by `/slot-availability/`
#[allow(dead_code)]
pub fn slot_json(location_id: u32, start: NaiveDateTime, active: bool) -> Value {
    let end = start + Duration::minutes(10);
    json!({
        "locationId": location_id,
        "startTimestamp": start.format("%Y-%m-%dT%H:%M").to_string(),
        "endTimestamp": end.format("%Y-%m-%dT%H:%M").to_string(),
        "active": active,
        "duration": 10,
        "remoteInd": false
    })
}

/// Availability response wrapping `slots`
#[allow(dead_code)]
pub fn availability_json(slots: Vec<Value>) -> Value {
    json!({
        "availableSlots": slots,
        "lastPublishedDate": "2024-05-01T07:45:13.331"
    })
}

/// Local now truncated to the minute
#[allow(dead_code)]
pub fn now_minute() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}
