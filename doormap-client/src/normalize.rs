//! Response normalization
//!
//! Deployed aggregate APIs differ in two ways this module papers over:
//!
//! - **Envelope shape**: a record may arrive as a bare object, wrapped in
//!   `{building: …}`, inside `{buildings: […]}`, or as a bare array.
//! - **Coordinate field names**: latitude and longitude appear under several
//!   capitalizations and abbreviations, sometimes nested in a `coordinates`
//!   sub-object.
//!
//! Everything resolves into one [`NormalizedAggregate`]. Records without a
//! usable coordinate pair get the configured default location and a
//! `needs_correction` flag instead of failing the whole fetch.

use crate::{ClientError, Result};
use doormap_common::config::Location;
use doormap_common::info_codec;
use serde_json::Value;

/// Latitude field names in priority order
const LAT_KEYS: [&str; 4] = ["lat", "latitude", "Lat", "Latitude"];

/// Longitude field names in priority order
const LONG_KEYS: [&str; 6] = ["long", "lng", "longitude", "Long", "Lng", "Longitude"];

/// One aggregate after shape, coordinate and door normalization
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAggregate {
    pub id: String,
    pub lat: f64,
    pub long: f64,
    pub address: Option<String>,
    pub language: Option<String>,
    pub congregation_id: Option<i64>,
    pub number_of_doors: usize,
    /// One label per door slot, padded to `number_of_doors`
    pub door_labels: Vec<String>,
    pub pin_color: Option<u32>,
    pub pin_image: Option<String>,
    /// True when no valid coordinates were found and the default location
    /// was substituted; the record needs manual correction
    pub needs_correction: bool,
}

/// Resolve a raw response body to the one record matching `id`
///
/// Accepts a bare object, `{building: …}`, `{buildings: […]}`, or a bare
/// array. Fails with NotFound when no candidate record matches.
pub fn normalize_shape<'a>(raw: &'a Value, id: &str) -> Result<&'a Value> {
    let candidate = match raw {
        Value::Object(obj) => {
            if let Some(building) = obj.get("building") {
                building
            } else if let Some(buildings) = obj.get("buildings") {
                return pick_from_array(buildings, id);
            } else {
                raw
            }
        }
        Value::Array(_) => return pick_from_array(raw, id),
        _ => {
            return Err(ClientError::Parse(format!(
                "unexpected response shape for aggregate {}",
                id
            )))
        }
    };

    // A single-record shape must not be a different aggregate
    match candidate.get("id") {
        Some(record_id) if !id_matches(record_id, id) => Err(ClientError::NotFound(format!(
            "response contained aggregate {:?}, wanted {}",
            record_id, id
        ))),
        _ => Ok(candidate),
    }
}

fn pick_from_array<'a>(raw: &'a Value, id: &str) -> Result<&'a Value> {
    let items = raw
        .as_array()
        .ok_or_else(|| ClientError::Parse(format!("expected array of aggregates for {}", id)))?;

    items
        .iter()
        .find(|item| item.get("id").map(|v| id_matches(v, id)).unwrap_or(false))
        .ok_or_else(|| ClientError::NotFound(format!("aggregate {} not in listing", id)))
}

fn id_matches(value: &Value, id: &str) -> bool {
    match value {
        Value::String(s) => s == id,
        Value::Number(n) => n.to_string() == id,
        _ => false,
    }
}

/// Extract a canonical coordinate pair from a raw record
///
/// Tries every latitude/longitude field-name combination in priority order,
/// both at the top level and under a `coordinates` sub-object. The first
/// in-range pair wins. With no valid pair the configured default location
/// is substituted and the second return value is true ("needs correction").
pub fn normalize_coordinates(raw: &Value, default: Location) -> (Location, bool) {
    let lats = coordinate_candidates(raw, &LAT_KEYS);
    let longs = coordinate_candidates(raw, &LONG_KEYS);

    for &lat in &lats {
        for &long in &longs {
            let location = Location::new(lat, long);
            if location.is_valid() {
                return (location, false);
            }
        }
    }

    tracing::warn!(
        "No valid coordinate pair in record, substituting default location"
    );
    (default, true)
}

/// Collect coordinate values for the given key names, top level first, then
/// the `coordinates` sub-object, preserving key priority order
fn coordinate_candidates(raw: &Value, keys: &[&str]) -> Vec<f64> {
    let mut found = Vec::new();

    for source in [Some(raw), raw.get("coordinates")].into_iter().flatten() {
        for key in keys {
            if let Some(value) = source.get(key).and_then(numeric_value) {
                found.push(value);
            }
        }
    }

    found
}

/// Accept numbers and numeric strings; deployed backends emit both
fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Extract the door count and padded label list from a raw record
///
/// Labels come from the delimited `info` field, padded to the declared
/// door count, or sized to the decoded length when the count is missing.
pub fn normalize_doors(raw: &Value) -> (usize, Vec<String>) {
    let info = raw.get("info").and_then(Value::as_str).unwrap_or("");

    let declared = raw
        .get("numberOfDoors")
        .or_else(|| raw.get("number_of_doors"))
        .and_then(Value::as_u64)
        .map(|n| n as usize);

    match declared {
        Some(count) => (count, info_codec::decode_padded(info, count)),
        None => {
            let labels = info_codec::decode_compact(info);
            (labels.len(), labels)
        }
    }
}

/// Normalize a raw response body into a canonical aggregate record
pub fn normalize_record(
    raw: &Value,
    id: &str,
    default: Location,
) -> Result<NormalizedAggregate> {
    let record = normalize_shape(raw, id)?;
    let (location, needs_correction) = normalize_coordinates(record, default);
    let (number_of_doors, door_labels) = normalize_doors(record);

    Ok(NormalizedAggregate {
        id: id.to_string(),
        lat: location.lat,
        long: location.long,
        address: record
            .get("address")
            .and_then(Value::as_str)
            .map(str::to_string),
        language: record
            .get("language")
            .and_then(Value::as_str)
            .map(str::to_string),
        congregation_id: record
            .get("congregationId")
            .or_else(|| record.get("congregation_id"))
            .and_then(Value::as_i64),
        number_of_doors,
        door_labels,
        pin_color: record
            .get("pinColor")
            .and_then(Value::as_u64)
            .map(|c| c as u32),
        pin_image: record
            .get("pinImage")
            .and_then(Value::as_str)
            .map(str::to_string),
        needs_correction,
    })
}
