// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::SEEN_WINDOW;
use async_trait::async_trait;
use pulse_adapters::NotifyAdapter;
use pulse_bus::{DedupWindow, EventHandler, HandlerError};
use pulse_core::{event_type, key, Event};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Consecutive failures before a security warning
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;

/// Channel security warnings are sent on
pub const SECURITY_CHANNEL: &str = "security";

/// Identities with an open failure count; the oldest is forgotten first
pub const DEFAULT_TRACKED_IDENTITIES: usize = 10_000;

struct TrackerState {
    seen: DedupWindow,
    failures: HashMap<String, u32>,
    /// Insertion order of `failures` keys
    order: VecDeque<String>,
}

impl TrackerState {
    fn record_failure(&mut self, identity: &str, capacity: usize) -> u32 {
        if !self.failures.contains_key(identity) {
            while self.failures.len() >= capacity {
                let Some(oldest) = self.order.pop_front() else {
                    break;
                };
                self.failures.remove(&oldest);
            }
            self.order.push_back(identity.to_string());
        }
        let count = self.failures.entry(identity.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    fn reset(&mut self, identity: &str) {
        if self.failures.remove(identity).is_some() {
            self.order.retain(|tracked| tracked != identity);
        }
    }
}

/// Counts consecutive authentication failures per identity.
///
/// The identity is the email, or the IP address when no email is given.
/// Reaching the threshold logs a warning and sends one security
/// notification; a later success resets the count.
pub struct AuthFailureTracker {
    notify: Arc<dyn NotifyAdapter>,
    threshold: u32,
    capacity: usize,
    state: Mutex<TrackerState>,
}

impl AuthFailureTracker {
    pub fn new(notify: Arc<dyn NotifyAdapter>) -> Self {
        Self::with_threshold(notify, DEFAULT_FAILURE_THRESHOLD)
    }

    pub fn with_threshold(notify: Arc<dyn NotifyAdapter>, threshold: u32) -> Self {
        Self::with_limits(notify, threshold, DEFAULT_TRACKED_IDENTITIES)
    }

    /// Threshold plus a cap on how many identities are tracked at once
    pub fn with_limits(notify: Arc<dyn NotifyAdapter>, threshold: u32, capacity: usize) -> Self {
        Self {
            notify,
            threshold: threshold.max(1),
            capacity: capacity.max(1),
            state: Mutex::new(TrackerState {
                seen: DedupWindow::new(SEEN_WINDOW),
                failures: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Number of identities with an open failure count
    pub fn tracked(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .failures
            .len()
    }

    /// Current consecutive failure count for an identity
    pub fn failures(&self, identity: &str) -> u32 {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.failures.get(identity).copied().unwrap_or(0)
    }

    fn identity(event: &Event) -> Option<String> {
        event
            .get_str(key::EMAIL)
            .or_else(|| event.get_str(key::IP_ADDRESS))
            .map(str::to_string)
    }
}

#[async_trait]
impl EventHandler for AuthFailureTracker {
    fn name(&self) -> &str {
        "auth-failure-tracker"
    }

    async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        let Some(identity) = Self::identity(event) else {
            tracing::debug!(event_id = %event.id, "auth event without identity");
            return Ok(());
        };

        let crossed = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if !state.seen.insert(&event.id) {
                return Ok(());
            }
            match event.event_type.as_str() {
                event_type::AUTH_FAILURE => {
                    let count = state.record_failure(&identity, self.capacity);
                    (count == self.threshold).then_some(count)
                }
                event_type::AUTH_SUCCESS => {
                    state.reset(&identity);
                    None
                }
                _ => None,
            }
        };

        if let Some(count) = crossed {
            tracing::warn!(
                identity = %identity,
                failures = count,
                ip_address = event.get_str(key::IP_ADDRESS),
                "repeated authentication failures"
            );
            let message = format!("{} failed sign-in attempts for {}", count, identity);
            self.notify.send(SECURITY_CHANNEL, &message).await?;
        }
        Ok(())
    }
}
