// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event value object carried through every bus backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Open, string-keyed payload of an event
pub type EventData = serde_json::Map<String, Value>;

/// Convert a JSON value into event data.
///
/// Objects are taken as-is; anything else yields an empty map.
pub fn event_data(value: Value) -> EventData {
    match value {
        Value::Object(map) => map,
        _ => EventData::new(),
    }
}

/// An immutable record of something that happened.
///
/// Buses assign `id`, `timestamp` and `source` at publish time; callers only
/// choose the type, payload and acting user. The JSON encoding is the wire
/// shape used for broker transport and the persistent stream:
///
/// ```text
/// { "id", "type", "data", "timestamp" (RFC3339), "source", "user_id"? }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: EventData,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    /// Present when a user performed the action; absent for system events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

impl Event {
    /// Encode to the JSON wire shape
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode from the JSON wire shape
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Look up a payload value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Look up a payload value as a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    /// Look up a payload value as an integer
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.data.get(key).and_then(Value::as_i64)
    }

    /// True when no user is attributed to the event
    pub fn is_system(&self) -> bool {
        self.user_id.is_none()
    }

    /// The `<domain>` half of a `<domain>.<action>` type
    pub fn domain(&self) -> &str {
        self.event_type
            .split_once('.')
            .map_or(self.event_type.as_str(), |(domain, _)| domain)
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
