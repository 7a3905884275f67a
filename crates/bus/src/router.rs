// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local fan-out shared by both bus backends

use crate::bus::BusStats;
use crate::dispatch::Dispatcher;
use crate::registry::{EventHandler, HandlerRegistry};
use crate::subscription::{Delivery, SubscriberTable, Subscription};
use pulse_core::{BusConfig, Event};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Both routing tables, guarded together
#[derive(Default)]
struct Routes {
    subscribers: SubscriberTable,
    handlers: HandlerRegistry,
}

pub(crate) struct LocalRouter {
    routes: RwLock<Routes>,
    dispatcher: Dispatcher,
    capacity: usize,
    dropped: AtomicU64,
}

impl LocalRouter {
    pub(crate) fn new(config: &BusConfig) -> Self {
        Self {
            routes: RwLock::new(Routes::default()),
            dispatcher: Dispatcher::new(config.max_in_flight_handlers, config.handler_timeout),
            capacity: config.subscriber_capacity,
            dropped: AtomicU64::new(0),
        }
    }

    /// Non-blocking send to every subscriber of `topic`, then start every
    /// handler registered for the event's type.
    pub(crate) fn deliver(&self, topic: &str, event: Event) {
        let (subscribers, handlers) = {
            let routes = self.routes.read().unwrap_or_else(|e| e.into_inner());
            (
                routes.subscribers.subscribers(topic),
                routes.handlers.handlers_for(&event.event_type),
            )
        };

        for subscriber in &subscribers {
            match subscriber.try_deliver(event.clone()) {
                Delivery::Sent => {}
                Delivery::Full => {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        topic,
                        subscriber = subscriber.key(),
                        event_id = %event.id,
                        event_type = %event.event_type,
                        "subscriber buffer full, event dropped"
                    );
                }
                // Receiver dropped; the sweep removes it
                Delivery::Closed => {}
            }
        }

        if handlers.is_empty() {
            return;
        }
        let event = Arc::new(event);
        for handler in handlers {
            self.dispatcher.dispatch(handler, Arc::clone(&event));
        }
    }

    pub(crate) fn subscribe(&self, topic: &str) -> Subscription {
        let subscription = self
            .routes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .subscribers
            .open(topic, self.capacity);
        tracing::debug!(topic, capacity = self.capacity, "subscribed");
        subscription
    }

    pub(crate) fn unsubscribe(&self, topic: &str, subscription: &Subscription) {
        let removed = self
            .routes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .subscribers
            .close(topic, subscription.key());
        if removed {
            tracing::debug!(topic, "unsubscribed");
        }
    }

    pub(crate) fn register_handler(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        let name = handler.name().to_string();
        self.routes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .handlers
            .register(event_type, handler);
        tracing::debug!(event_type, handler = %name, "handler registered");
    }

    pub(crate) fn unregister_handler(&self, event_type: &str, handler: &Arc<dyn EventHandler>) {
        let removed = self
            .routes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .handlers
            .unregister(event_type, handler);
        if removed {
            tracing::debug!(event_type, handler = handler.name(), "handler unregistered");
        }
    }

    /// Drop channels whose receivers are gone
    pub(crate) fn sweep(&self) -> usize {
        let pruned = self
            .routes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .subscribers
            .prune_closed();
        if pruned > 0 {
            tracing::debug!(pruned, "pruned closed subscriptions");
        }
        pruned
    }

    /// Close every subscriber channel and forget all handlers
    pub(crate) fn close(&self) {
        let mut routes = self.routes.write().unwrap_or_else(|e| e.into_inner());
        routes.subscribers.clear();
        routes.handlers.clear();
    }

    pub(crate) fn stats(&self) -> BusStats {
        let routes = self.routes.read().unwrap_or_else(|e| e.into_inner());
        let topic_subscribers = routes.subscribers.counts();
        let mut dispatch = self.dispatcher.stats();
        dispatch.dropped_deliveries = self.dropped.load(Ordering::Relaxed);
        BusStats {
            topics: topic_subscribers.len(),
            total_subscribers: routes.subscribers.total(),
            total_handlers: routes.handlers.total(),
            topic_subscribers,
            event_handlers: routes.handlers.counts(),
            dispatch,
            broker: None,
        }
    }
}

/// Periodically prune closed channels until the router is dropped
pub(crate) fn spawn_sweeper(router: &Arc<LocalRouter>, interval: Duration) -> JoinHandle<()> {
    let router: Weak<LocalRouter> = Arc::downgrade(router);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(router) = router.upgrade() else {
                break;
            };
            router.sweep();
        }
    })
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
