// Core data structures for the scheduling API

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// Service offered at an enrollment location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationService {
    pub id: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

/// Enrollment location as returned by `GET /locations/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub short_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub address_additional: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub postal_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tz_data: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub temporary: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub invite_only: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub operational: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub services: Vec<LocationService>,
}

impl Location {
    /// Human-readable label: `"<short name> (<id>)"`
    pub fn label(&self) -> String {
        let short = self.short_name.trim();
        if short.is_empty() {
            format!("{} ({})", self.name.trim(), self.id)
        } else {
            format!("{short} ({})", self.id)
        }
    }

    /// Case-insensitive match against name, short name and city
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        [&self.name, &self.short_name, &self.city]
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
    }
}

/// One appointment slot reported for a location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlot {
    pub location_id: u32,
    #[serde(with = "local_timestamp")]
    pub start_timestamp: NaiveDateTime,
    #[serde(with = "local_timestamp")]
    pub end_timestamp: NaiveDateTime,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: bool,
    /// Slot length in minutes
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub remote_ind: bool,
}

/// Availability response for a single location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SlotAvailability {
    #[serde(default, deserialize_with = "null_as_default")]
    pub available_slots: Vec<AvailableSlot>,
    #[serde(default, with = "optional_local_timestamp")]
    pub last_published_date: Option<NaiveDateTime>,
}

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Serde adapter for API timestamps, which may omit seconds
mod local_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::utils::{parse_local_timestamp, TIMESTAMP_FORMAT};

    pub fn serialize<S: Serializer>(
        value: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_local_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

mod optional_local_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::utils::{parse_local_timestamp, TIMESTAMP_FORMAT};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.collect_str(&ts.format(TIMESTAMP_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => parse_local_timestamp(value)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
