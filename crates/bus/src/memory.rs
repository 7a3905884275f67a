// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process bus backend

use crate::bus::{BusStats, EventBus};
use crate::error::BusError;
use crate::registry::EventHandler;
use crate::router::{spawn_sweeper, LocalRouter};
use crate::subscription::Subscription;
use async_trait::async_trait;
use pulse_core::{BusConfig, Clock, Event, EventData, IdGen, SystemClock, TimeIdGen};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// Channel-based bus with no external dependencies.
///
/// Delivery is at-most-once: an event is lost for any subscriber whose
/// buffer is full, and nothing survives a restart. Ids are time-based and
/// unique within the process.
pub struct InProcessBus {
    router: Arc<LocalRouter>,
    source: String,
    clock: Arc<dyn Clock>,
    id_gen: Arc<dyn IdGen>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
    shut_down: AtomicBool,
}

impl InProcessBus {
    /// Create the bus and start its sweep task. Must be called within a tokio runtime.
    pub fn new(config: &BusConfig, source: impl Into<String>) -> Self {
        Self::with_parts(config, source, Arc::new(SystemClock), Arc::new(TimeIdGen::new()))
    }

    /// Create with explicit clock and id generator
    pub fn with_parts(
        config: &BusConfig,
        source: impl Into<String>,
        clock: Arc<dyn Clock>,
        id_gen: Arc<dyn IdGen>,
    ) -> Self {
        let router = Arc::new(LocalRouter::new(config));
        let sweeper = spawn_sweeper(&router, config.sweep_interval);
        Self {
            router,
            source: source.into(),
            clock,
            id_gen,
            sweeper: Mutex::new(Some(sweeper)),
            shut_down: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl EventBus for InProcessBus {
    async fn publish(
        &self,
        topic: &str,
        event_type: &str,
        data: EventData,
        user_id: Option<i64>,
    ) -> Result<(), BusError> {
        if self.shut_down.load(Ordering::Acquire) {
            return Err(BusError::ShutDown);
        }
        let event = Event {
            id: self.id_gen.next(),
            event_type: event_type.to_string(),
            data,
            timestamp: self.clock.now(),
            source: self.source.clone(),
            user_id,
        };
        tracing::trace!(topic, event_type, event_id = %event.id, "publish");
        self.router.deliver(topic, event);
        Ok(())
    }

    fn subscribe(&self, topic: &str) -> Result<Subscription, BusError> {
        if self.shut_down.load(Ordering::Acquire) {
            return Err(BusError::ShutDown);
        }
        Ok(self.router.subscribe(topic))
    }

    fn unsubscribe(&self, topic: &str, subscription: &Subscription) {
        self.router.unsubscribe(topic, subscription);
    }

    fn register_handler(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        self.router.register_handler(event_type, handler);
    }

    fn unregister_handler(&self, event_type: &str, handler: &Arc<dyn EventHandler>) {
        self.router.unregister_handler(event_type, handler);
    }

    async fn shutdown(&self) -> Result<(), BusError> {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        if let Some(sweeper) = self.sweeper.lock().unwrap_or_else(|e| e.into_inner()).take() {
            sweeper.abort();
        }
        self.router.close();
        tracing::info!(source = %self.source, "in-process bus shut down");
        Ok(())
    }

    fn stats(&self) -> BusStats {
        self.router.stats()
    }
}

impl Drop for InProcessBus {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.lock().unwrap_or_else(|e| e.into_inner()).take() {
            sweeper.abort();
        }
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
