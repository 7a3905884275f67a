// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use pulse_core::EventData;
use serde_json::Value;

/// Builder for canonical event payloads.
///
/// `None` values are left out, so absent optional fields never appear as
/// `null` on the wire.
#[derive(Debug, Default, Clone)]
pub struct Payload(EventData);

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn maybe<V: Into<Value>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    /// Merge caller extension fields. Keys already set are kept.
    pub fn extend(mut self, extra: EventData) -> Self {
        for (key, value) in extra {
            self.0.entry(key).or_insert(value);
        }
        self
    }

    pub fn build(self) -> EventData {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn none_values_are_omitted() {
        let data = Payload::new()
            .with("user_id", 1)
            .maybe("email", None::<&str>)
            .maybe("name", Some("Ada"))
            .build();

        assert_eq!(data.len(), 2);
        assert_eq!(data["name"], json!("Ada"));
    }

    #[test]
    fn canonical_keys_win_over_extensions() {
        let mut extra = EventData::new();
        extra.insert("user_id".to_string(), json!(999));
        extra.insert("plan".to_string(), json!("pro"));

        let data = Payload::new().with("user_id", 1).extend(extra).build();

        assert_eq!(data["user_id"], json!(1));
        assert_eq!(data["plan"], json!("pro"));
    }
}
