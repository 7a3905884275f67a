// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable bus: broker transport, persistent stream, replay

use crate::prelude::*;
use pulse_adapters::{Broker, EventStream, FakeBroker, FileStreamLog};
use pulse_bus::{BusError, DurableBus, EventBus};
use pulse_core::{event_data, Backend, Config, Event, SubjectPattern};
use serde_json::json;
use std::time::Duration;

fn file_stream(dir: &tempfile::TempDir) -> FileStreamLog {
    FileStreamLog::new(
        "EVENTS",
        dir.path().join("events.log"),
        Duration::from_secs(3600),
    )
}

fn deduplicating() -> Config {
    let mut config = Config::default();
    config.source = "durable-specs".to_string();
    config.bus.dedup_window = 1024;
    config
}

#[tokio::test]
async fn stream_holds_the_exact_event_encoding() {
    let dir = tempfile::tempdir().unwrap();
    let broker = FakeBroker::new();
    let stream = file_stream(&dir);
    let bus = DurableBus::start(&deduplicating(), broker.clone(), stream.clone())
        .await
        .unwrap();
    let mut sub = bus.subscribe("organizations").unwrap();

    bus.publish(
        "organizations",
        "organization.created",
        event_data(json!({"organization_id": 9, "organization_name": "Acme"})),
        Some(3),
    )
    .await
    .unwrap();

    let delivered = next(&mut sub).await.unwrap();
    let stored = stream
        .read(&SubjectPattern::new("events.organizations.>"), 0, 10)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].subject, "events.organizations.organization.created");
    assert_eq!(stored[0].payload.as_ref(), delivered.to_json().unwrap().as_slice());
    assert_eq!(broker.published()[0].payload, stored[0].payload);
}

#[tokio::test]
async fn dedup_suppresses_the_broker_echo() {
    let dir = tempfile::tempdir().unwrap();
    let bus = DurableBus::start(&deduplicating(), FakeBroker::new(), file_stream(&dir))
        .await
        .unwrap();
    let mut sub = bus.subscribe("users").unwrap();

    bus.publish("users", "user.login", event_data(json!({"user_id": 1})), Some(1))
        .await
        .unwrap();

    assert!(next(&mut sub).await.is_some());
    assert!(next(&mut sub).await.is_none());
}

#[tokio::test]
async fn events_from_other_publishers_reach_local_subscribers() {
    let dir = tempfile::tempdir().unwrap();
    let broker = FakeBroker::new();
    let bus = DurableBus::start(&deduplicating(), broker.clone(), file_stream(&dir))
        .await
        .unwrap();
    let mut sub = bus.subscribe("admin").unwrap();

    let remote = Event {
        id: "remote-1".to_string(),
        event_type: "admin.login".to_string(),
        data: event_data(json!({"user_id": 5})),
        timestamp: chrono_epoch(),
        source: "other-host".to_string(),
        user_id: Some(5),
    };
    broker
        .publish("events.admin.admin.login", remote.to_json().unwrap().into())
        .await
        .unwrap();

    let event = next(&mut sub).await.unwrap();
    assert_eq!(event.id, "remote-1");
    assert_eq!(event.source, "other-host");
}

#[tokio::test]
async fn replay_returns_events_in_sequence_order() {
    let dir = tempfile::tempdir().unwrap();
    let bus = DurableBus::start(&deduplicating(), FakeBroker::new(), file_stream(&dir))
        .await
        .unwrap();

    for (topic, kind) in [
        ("users", "user.created"),
        ("roles", "role.assigned"),
        ("users", "user.deleted"),
    ] {
        bus.publish(topic, kind, event_data(json!({})), None)
            .await
            .unwrap();
    }

    let users = bus
        .replay(&SubjectPattern::new("events.users.*"), 0, 10)
        .await
        .unwrap();
    let kinds: Vec<_> = users.iter().map(|(_, e)| e.event_type.as_str()).collect();
    assert_eq!(kinds, vec!["user.created", "user.deleted"]);
    assert!(users[0].0 < users[1].0);
}

#[tokio::test]
async fn broker_failure_is_a_transport_error() {
    let dir = tempfile::tempdir().unwrap();
    let broker = FakeBroker::new();
    let bus = DurableBus::start(&deduplicating(), broker.clone(), file_stream(&dir))
        .await
        .unwrap();
    let mut sub = bus.subscribe("users").unwrap();

    broker.set_fail_publish(true);
    let result = bus
        .publish("users", "user.created", event_data(json!({})), None)
        .await;

    assert!(matches!(result, Err(BusError::Transport(_))));
    assert!(next(&mut sub).await.is_none());
}

#[tokio::test]
async fn stats_report_broker_connection() {
    let dir = tempfile::tempdir().unwrap();
    let broker = FakeBroker::new();
    let bus = DurableBus::start(&deduplicating(), broker.clone(), file_stream(&dir))
        .await
        .unwrap();

    let info = bus.stats().broker.unwrap();
    assert!(info.connected);

    bus.shutdown().await.unwrap();
    bus.shutdown().await.unwrap();
    assert!(!bus.stats().broker.unwrap().connected);
}

#[tokio::test]
async fn unreachable_broker_fails_construction() {
    let mut config = Config::default();
    config.bus.backend = Backend::Durable;
    config.broker.url = "nats://127.0.0.1:1".to_string();
    config.broker.connect_attempts = 1;
    config.broker.connect_timeout = Duration::from_millis(200);

    let result = pulse_bus::connect(&config).await;
    assert!(matches!(result, Err(BusError::Transport(_))));
}

fn chrono_epoch() -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp(0, 0).unwrap()
}
