// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process bus: fan-out, handlers, backpressure, lifecycle

use crate::prelude::*;
use pulse_bus::{BusError, EventBus};
use pulse_core::{event_data, EventData};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[tokio::test]
async fn subscriber_receives_user_created() {
    let bus = memory_bus();
    let mut sub = bus.subscribe("users").unwrap();

    bus.publish(
        "users",
        "user.created",
        event_data(json!({"user_id": 42, "email": "a@b.c"})),
        Some(42),
    )
    .await
    .unwrap();

    let event = next(&mut sub).await.unwrap();
    assert_eq!(event.event_type, "user.created");
    assert_eq!(event.user_id, Some(42));
    assert_eq!(event.get_str("email"), Some("a@b.c"));
    assert_eq!(event.source, "specs");
    assert!(!event.id.is_empty());
    assert!(next(&mut sub).await.is_none());
}

#[tokio::test]
async fn each_subscriber_gets_its_own_copy() {
    let bus = memory_bus();
    let mut first = bus.subscribe("roles").unwrap();
    let mut second = bus.subscribe("roles").unwrap();
    let mut other_topic = bus.subscribe("users").unwrap();

    bus.publish("roles", "role.created", EventData::new(), None)
        .await
        .unwrap();

    let a = next(&mut first).await.unwrap();
    let b = next(&mut second).await.unwrap();
    assert_eq!(a.id, b.id);
    assert!(next(&mut other_topic).await.is_none());
}

#[tokio::test]
async fn three_auth_failures_are_all_handled() {
    let bus = memory_bus();
    let hits = Arc::new(AtomicUsize::new(0));
    bus.register_handler("auth.failure", counter("failures", &hits));

    for _ in 0..3 {
        bus.publish("auth", "auth.failure", EventData::new(), None)
            .await
            .unwrap();
    }

    assert!(eventually(|| hits.load(Ordering::SeqCst) == 3).await);
}

#[tokio::test]
async fn failing_handler_does_not_stop_siblings() {
    let bus = memory_bus();
    let hits = Arc::new(AtomicUsize::new(0));
    bus.register_handler("system.error", failing("broken"));
    bus.register_handler("system.error", counter("working", &hits));

    bus.publish("system", "system.error", EventData::new(), None)
        .await
        .unwrap();

    assert!(eventually(|| hits.load(Ordering::SeqCst) == 1).await);
    assert!(eventually(|| bus.stats().dispatch.failed == 1).await);
}

#[tokio::test]
async fn undrained_subscriber_buffers_at_most_capacity() {
    let bus = memory_bus();
    let mut slow = bus.subscribe("users").unwrap();
    let mut fast = bus.subscribe("users").unwrap();

    for n in 0..150 {
        bus.publish("users", "user.updated", event_data(json!({"n": n})), None)
            .await
            .unwrap();
        // the fast subscriber keeps up
        assert!(fast.try_recv().is_some());
    }

    assert_eq!(slow.len(), 100);
    let mut received = 0;
    while slow.try_recv().is_some() {
        received += 1;
    }
    assert_eq!(received, 100);
    assert_eq!(bus.stats().dispatch.dropped_deliveries, 50);
}

#[tokio::test]
async fn unregistering_unknown_handler_is_noop() {
    let bus = memory_bus();
    let hits = Arc::new(AtomicUsize::new(0));
    let registered = counter("registered", &hits);
    bus.register_handler("admin.action", Arc::clone(&registered));

    bus.unregister_handler("admin.action", &counter("stranger", &hits));
    bus.unregister_handler("never.registered", &registered);

    assert_eq!(bus.stats().event_handlers.get("admin.action"), Some(&1));
    assert_eq!(bus.stats().total_handlers, 1);
}

#[tokio::test]
async fn unsubscribe_closes_channel_and_repeats_are_harmless() {
    let bus = memory_bus();
    let mut sub = bus.subscribe("auth").unwrap();
    assert_eq!(bus.stats().total_subscribers, 1);

    bus.unsubscribe("auth", &sub);
    bus.unsubscribe("auth", &sub);

    assert_eq!(bus.stats().total_subscribers, 0);
    assert!(sub.recv().await.is_none());
}

#[tokio::test]
async fn stats_count_subscribers_and_handlers() {
    let bus = memory_bus();
    let hits = Arc::new(AtomicUsize::new(0));
    let _a = bus.subscribe("users").unwrap();
    let _b = bus.subscribe("users").unwrap();
    let _c = bus.subscribe("system").unwrap();
    bus.register_handler("user.created", counter("one", &hits));
    bus.register_handler("user.created", counter("two", &hits));

    let stats = bus.stats();
    assert_eq!(stats.total_subscribers, 3);
    assert_eq!(stats.topic_subscribers.get("users"), Some(&2));
    assert_eq!(stats.event_handlers.get("user.created"), Some(&2));
    assert!(stats.broker.is_none());
}

#[tokio::test]
async fn shutdown_twice_is_fine_and_closes_everything() {
    let bus = memory_bus();
    let mut sub = bus.subscribe("users").unwrap();

    bus.shutdown().await.unwrap();
    bus.shutdown().await.unwrap();

    assert!(sub.recv().await.is_none());
    assert_eq!(bus.stats().total_subscribers, 0);
    assert!(matches!(
        bus.publish("users", "user.created", EventData::new(), None)
            .await,
        Err(BusError::ShutDown)
    ));
}
