// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stream entry structure with checksum verification

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A single message in the persistent stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEntry {
    /// Monotonically increasing sequence number, starting at 1
    pub sequence: u64,
    /// Microseconds since Unix epoch when the entry was appended
    pub timestamp_micros: u64,
    /// Broker subject the message was published on
    pub subject: String,
    /// The message body, stored verbatim
    pub payload: String,
    /// CRC32 of subject and payload
    pub checksum: u32,
}

impl StreamEntry {
    /// Create a new entry stamped with the current time
    pub fn new(sequence: u64, subject: &str, payload: String) -> Self {
        Self::new_with_timestamp(sequence, now_micros(), subject, payload)
    }

    /// Create a new entry with a specific timestamp (for testing and pruning)
    pub fn new_with_timestamp(
        sequence: u64,
        timestamp_micros: u64,
        subject: &str,
        payload: String,
    ) -> Self {
        let checksum = Self::calculate_checksum(subject, &payload);
        Self {
            sequence,
            timestamp_micros,
            subject: subject.to_string(),
            payload,
            checksum,
        }
    }

    fn calculate_checksum(subject: &str, payload: &str) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(subject.as_bytes());
        hasher.update(&[0]);
        hasher.update(payload.as_bytes());
        hasher.finalize()
    }

    /// Verify the checksum matches the content
    pub fn verify(&self) -> bool {
        self.checksum == Self::calculate_checksum(&self.subject, &self.payload)
    }

    /// Serialize to newline-delimited JSON (one line)
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from a single line of JSON
    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Current time in microseconds since the Unix epoch
pub(crate) fn now_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
