// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use pulse_bus::{EventHandler, HandlerError};
use pulse_core::Event;
use std::collections::HashMap;
use std::sync::Mutex;

/// Per-type event counters.
///
/// Counts invocations, so a duplicate echo is counted twice.
#[derive(Default)]
pub struct MetricsHandler {
    counts: Mutex<HashMap<String, u64>>,
}

impl MetricsHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, event_type: &str) -> u64 {
        let counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
        counts.get(event_type).copied().unwrap_or(0)
    }

    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.counts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl EventHandler for MetricsHandler {
    fn name(&self) -> &str {
        "metrics"
    }

    async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        let mut counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
        *counts.entry(event.event_type.clone()).or_insert(0) += 1;
        Ok(())
    }
}
