// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event id generation

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Generates unique event identifiers
pub trait IdGen: Send + Sync {
    fn next(&self) -> String;
}

/// UUID-based ID generator, unique across processes
#[derive(Clone, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Time-based ID generator, unique within one process.
///
/// Ids are `<unix nanos>-<counter>`; the counter keeps ids distinct when two
/// publishes land on the same clock tick.
#[derive(Clone, Default)]
pub struct TimeIdGen {
    counter: Arc<AtomicU64>,
}

impl TimeIdGen {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGen for TimeIdGen {
    fn next(&self) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", nanos, n)
    }
}

/// Sequential ID generator for testing
#[derive(Clone)]
pub struct SequentialIdGen {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("evt")
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}-{}", self.prefix, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn uuid_gen_creates_unique_ids() {
        let id_gen = UuidIdGen;
        let id1 = id_gen.next();
        let id2 = id_gen.next();
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 36); // UUID format
    }

    #[test]
    fn time_gen_is_unique_under_tight_loop() {
        let id_gen = TimeIdGen::new();
        let ids: HashSet<String> = (0..1000).map(|_| id_gen.next()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn sequential_gen_creates_predictable_ids() {
        let id_gen = SequentialIdGen::new("test");
        assert_eq!(id_gen.next(), "test-1");
        assert_eq!(id_gen.next(), "test-2");
        assert_eq!(id_gen.next(), "test-3");
    }

    #[test]
    fn sequential_gen_is_cloneable_and_shared() {
        let id_gen1 = SequentialIdGen::new("shared");
        let id_gen2 = id_gen1.clone();
        assert_eq!(id_gen1.next(), "shared-1");
        assert_eq!(id_gen2.next(), "shared-2");
        assert_eq!(id_gen1.next(), "shared-3");
    }
}
