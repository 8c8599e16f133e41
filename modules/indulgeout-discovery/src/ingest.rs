//! Loading event lists and filter documents from JSON.
//!
//! Bad individual records are skipped, never fatal. Only a document with no
//! recognizable event array is an error.

use std::path::Path;

use indulgeout_common::{DiscoveryError, Event};
use serde_json::Value;
use tracing::{debug, warn};

use crate::filter::FilterConfig;

/// Envelope keys the events endpoint has wrapped its array in.
const ENVELOPE_KEYS: &[&str] = &["events", "data"];

pub fn parse_events(json: &str) -> Result<Vec<Event>, DiscoveryError> {
    let document: Value = serde_json::from_str(json)?;
    let records = match document {
        Value::Array(records) => records,
        Value::Object(mut map) => ENVELOPE_KEYS
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(records)) => Some(records),
                _ => None,
            })
            .ok_or_else(|| {
                DiscoveryError::InvalidDocument(format!(
                    "expected an event array or an object with one of {ENVELOPE_KEYS:?}"
                ))
            })?,
        other => {
            return Err(DiscoveryError::InvalidDocument(format!(
                "expected an event array, got {}",
                json_kind(&other)
            )))
        }
    };

    let received = records.len();
    let events: Vec<Event> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<Event>(record) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed event record");
                None
            }
        })
        .collect();

    debug!(received, parsed = events.len(), "Event list parsed");
    Ok(events)
}

pub fn load_events(path: &Path) -> Result<Vec<Event>, DiscoveryError> {
    let json = std::fs::read_to_string(path)?;
    parse_events(&json)
}

pub fn parse_filter_config(json: &str) -> Result<FilterConfig, DiscoveryError> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_filter_config(path: &Path) -> Result<FilterConfig, DiscoveryError> {
    let json = std::fs::read_to_string(path)?;
    parse_filter_config(&json)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
