// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded, detached handler invocation

use crate::registry::EventHandler;
use pulse_core::Event;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Handler invocation counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub in_flight: u64,
    pub completed: u64,
    pub failed: u64,
    pub timed_out: u64,
    /// Invocations dropped because every permit was taken
    pub rejected: u64,
    /// Subscriber copies dropped on full channels (filled in by the bus)
    pub dropped_deliveries: u64,
}

#[derive(Default)]
struct Counters {
    in_flight: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    timed_out: AtomicU64,
    rejected: AtomicU64,
}

/// Decrements `in_flight` however the task ends
struct InFlight(Arc<Counters>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Runs each handler invocation in its own task under a timeout.
///
/// With a permit limit, an invocation that finds no free permit is rejected
/// rather than queued, so a burst of slow handlers cannot pile up unbounded
/// tasks. A limit of 0 spawns every invocation.
pub struct Dispatcher {
    permits: Option<Arc<Semaphore>>,
    timeout: Duration,
    counters: Arc<Counters>,
}

impl Dispatcher {
    pub fn new(max_in_flight: usize, timeout: Duration) -> Self {
        Self {
            permits: (max_in_flight > 0).then(|| Arc::new(Semaphore::new(max_in_flight))),
            timeout,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Start `handler` on `event` without waiting for it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, handler: Arc<dyn EventHandler>, event: Arc<Event>) {
        let permit = match &self.permits {
            Some(semaphore) => match Arc::clone(semaphore).try_acquire_owned() {
                Ok(permit) => Some(permit),
                Err(_) => {
                    self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        handler = handler.name(),
                        event_id = %event.id,
                        event_type = %event.event_type,
                        "handler pool full, invocation dropped"
                    );
                    return;
                }
            },
            None => None,
        };

        self.counters.in_flight.fetch_add(1, Ordering::AcqRel);
        let guard = InFlight(Arc::clone(&self.counters));
        let counters = Arc::clone(&self.counters);
        let timeout = self.timeout;

        tokio::spawn(async move {
            let _permit = permit;
            let _guard = guard;
            match tokio::time::timeout(timeout, handler.handle(&event)).await {
                Ok(Ok(())) => {
                    counters.completed.fetch_add(1, Ordering::Relaxed);
                    tracing::trace!(handler = handler.name(), event_id = %event.id, "handler done");
                }
                Ok(Err(e)) => {
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    tracing::error!(
                        handler = handler.name(),
                        event_id = %event.id,
                        event_type = %event.event_type,
                        error = %e,
                        "handler failed"
                    );
                }
                Err(_) => {
                    counters.timed_out.fetch_add(1, Ordering::Relaxed);
                    tracing::error!(
                        handler = handler.name(),
                        event_id = %event.id,
                        event_type = %event.event_type,
                        timeout_ms = timeout.as_millis() as u64,
                        "handler timed out"
                    );
                }
            }
        });
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            in_flight: self.counters.in_flight.load(Ordering::Acquire),
            completed: self.counters.completed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            timed_out: self.counters.timed_out.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
            dropped_deliveries: 0,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
