// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Broker-backed bus backend with a persistent stream

use crate::bus::{BusStats, EventBus};
use crate::dedup::DedupWindow;
use crate::error::BusError;
use crate::registry::EventHandler;
use crate::router::{spawn_sweeper, LocalRouter};
use crate::subscription::Subscription;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use pulse_adapters::{Broker, EventStream, MessageStream};
use pulse_core::{
    parse_subject, subject_for, Clock, Config, Event, EventData, IdGen, SubjectPattern,
    SystemClock, UuidIdGen, SUBJECT_WILDCARD,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

type SharedDedup = Arc<Option<Mutex<DedupWindow>>>;

/// Bus that publishes through a message broker and records every event in
/// a persistent stream.
///
/// Events from any process on the broker, this one included, come back
/// through an internal `events.>` subscription and are fanned out locally
/// again. Without a dedup window a local subscriber therefore sees its own
/// events twice: delivery is at-least-once.
pub struct DurableBus<B, S> {
    router: Arc<LocalRouter>,
    broker: B,
    stream: S,
    source: String,
    clock: Arc<dyn Clock>,
    id_gen: Arc<dyn IdGen>,
    dedup: SharedDedup,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    shut_down: AtomicBool,
}

impl<B: Broker, S: EventStream> DurableBus<B, S> {
    /// Ensure the stream exists, subscribe to the broker echo, and start
    /// background maintenance. Ids are UUID v4.
    pub async fn start(config: &Config, broker: B, stream: S) -> Result<Self, BusError> {
        Self::start_with(
            config,
            broker,
            stream,
            Arc::new(SystemClock),
            Arc::new(UuidIdGen),
        )
        .await
    }

    /// Start with explicit clock and id generator
    pub async fn start_with(
        config: &Config,
        broker: B,
        stream: S,
        clock: Arc<dyn Clock>,
        id_gen: Arc<dyn IdGen>,
    ) -> Result<Self, BusError> {
        stream.ensure().await?;
        let echo = broker.subscribe(SUBJECT_WILDCARD).await?;

        let router = Arc::new(LocalRouter::new(&config.bus));
        let dedup: SharedDedup = Arc::new(
            (config.bus.dedup_window > 0)
                .then(|| Mutex::new(DedupWindow::new(config.bus.dedup_window))),
        );

        let mut tasks = vec![
            spawn_sweeper(&router, config.bus.sweep_interval),
            spawn_echo(Arc::clone(&router), Arc::clone(&dedup), echo),
        ];
        if !config.stream.prune_interval.is_zero() {
            tasks.push(spawn_pruner(stream.clone(), config.stream.prune_interval));
        }

        tracing::info!(
            source = %config.source,
            dedup_window = config.bus.dedup_window,
            "durable bus started"
        );

        Ok(Self {
            router,
            broker,
            stream,
            source: config.source.clone(),
            clock,
            id_gen,
            dedup,
            tasks: Mutex::new(tasks),
            shut_down: AtomicBool::new(false),
        })
    }

    /// The persistent stream, for replay and audit readers
    pub fn stream(&self) -> &S {
        &self.stream
    }

    pub fn broker(&self) -> &B {
        &self.broker
    }

    /// Decode stored events matching `filter` from `from_sequence` on.
    ///
    /// Entries that are not valid events are skipped with a warning.
    pub async fn replay(
        &self,
        filter: &SubjectPattern,
        from_sequence: u64,
        limit: usize,
    ) -> Result<Vec<(u64, Event)>, BusError> {
        let messages = self.stream.read(filter, from_sequence, limit).await?;
        Ok(messages
            .into_iter()
            .filter_map(|message| match Event::from_json(&message.payload) {
                Ok(event) => Some((message.sequence, event)),
                Err(e) => {
                    tracing::warn!(sequence = message.sequence, error = %e, "skipping undecodable entry");
                    None
                }
            })
            .collect())
    }

    fn remember(&self, id: &str) {
        if let Some(window) = self.dedup.as_ref() {
            window.lock().unwrap_or_else(|e| e.into_inner()).insert(id);
        }
    }

    fn abort_tasks(&self) {
        for task in self.tasks.lock().unwrap_or_else(|e| e.into_inner()).drain(..) {
            task.abort();
        }
    }
}

#[async_trait]
impl<B: Broker, S: EventStream> EventBus for DurableBus<B, S> {
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
        let subject = subject_for(topic, event_type);
        // Claimed before the broker sees it so the echo cannot win the race
        self.remember(&event.id);

        let payload = match event.to_json() {
            Ok(bytes) => Bytes::from(bytes),
            Err(e) => {
                tracing::error!(subject, event_id = %event.id, error = %e, "event encoding failed");
                self.router.deliver(topic, event);
                return Err(BusError::Serialization(e));
            }
        };

        self.broker.publish(&subject, payload.clone()).await?;

        if !self.stream.captures_broker_traffic() {
            if let Err(e) = self.stream.append(&subject, payload).await {
                tracing::warn!(subject, event_id = %event.id, error = %e, "stream append failed");
            }
        }

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
        self.abort_tasks();
        self.router.close();
        self.broker.close().await?;
        tracing::info!(source = %self.source, "durable bus shut down");
        Ok(())
    }

    fn stats(&self) -> BusStats {
        let mut stats = self.router.stats();
        stats.broker = Some(self.broker.info());
        stats
    }
}

impl<B, S> Drop for DurableBus<B, S> {
    fn drop(&mut self) {
        for task in self.tasks.lock().unwrap_or_else(|e| e.into_inner()).drain(..) {
            task.abort();
        }
    }
}

/// Fan broker-delivered events back into the local router
fn spawn_echo(router: Arc<LocalRouter>, dedup: SharedDedup, mut echo: MessageStream) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = echo.next().await {
            let Some((topic, _)) = parse_subject(&message.subject) else {
                tracing::warn!(subject = %message.subject, "echo on unexpected subject");
                continue;
            };
            let event = match Event::from_json(&message.payload) {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!(subject = %message.subject, error = %e, "undecodable echo");
                    continue;
                }
            };
            if let Some(window) = dedup.as_ref() {
                if !window.lock().unwrap_or_else(|e| e.into_inner()).insert(&event.id) {
                    tracing::trace!(event_id = %event.id, "duplicate echo skipped");
                    continue;
                }
            }
            router.deliver(topic, event);
        }
        tracing::warn!("broker echo subscription ended");
    })
}

/// Periodically drop stream entries past retention
fn spawn_pruner<S: EventStream>(stream: S, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick fires immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = stream.prune().await {
                tracing::warn!(error = %e, "stream prune failed");
            }
        }
    })
}

#[cfg(test)]
#[path = "durable_tests.rs"]
mod tests;
