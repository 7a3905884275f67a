// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pulse_core::{Clock, FakeClock};

fn event(n: u32) -> Event {
    Event {
        id: format!("evt-{}", n),
        event_type: "user.created".to_string(),
        data: Default::default(),
        timestamp: FakeClock::new().now(),
        source: "test".to_string(),
        user_id: Some(42),
    }
}

#[test]
fn open_assigns_distinct_keys() {
    let mut table = SubscriberTable::default();
    let a = table.open("users", 4);
    let b = table.open("users", 4);
    let c = table.open("auth", 4);

    assert_ne!(a.key(), b.key());
    assert_eq!(table.total(), 3);
    assert_eq!(table.counts().get("users"), Some(&2));
    assert_eq!(c.topic(), "auth");
}

#[test]
fn full_channel_reports_full_without_blocking() {
    let mut table = SubscriberTable::default();
    let sub = table.open("users", 2);
    let subscriber = &table.subscribers("users")[0];

    assert_eq!(subscriber.try_deliver(event(1)), Delivery::Sent);
    assert_eq!(subscriber.try_deliver(event(2)), Delivery::Sent);
    assert_eq!(subscriber.try_deliver(event(3)), Delivery::Full);
    assert_eq!(sub.len(), 2);
}

#[tokio::test]
async fn close_ends_the_receiver() {
    let mut table = SubscriberTable::default();
    let mut sub = table.open("users", 4);
    table.subscribers("users")[0].try_deliver(event(1));

    assert!(table.close("users", sub.key()));
    assert!(!table.close("users", sub.key()));

    // Queued events drain before the channel reports closed
    assert_eq!(sub.recv().await.unwrap().id, "evt-1");
    assert!(sub.recv().await.is_none());
}

#[test]
fn prune_keeps_live_channels_and_their_queues() {
    let mut table = SubscriberTable::default();
    let live = table.open("users", 4);
    let dropped = table.open("users", 4);
    table.subscribers("users")[0].try_deliver(event(1));
    drop(dropped);

    assert_eq!(table.prune_closed(), 1);
    assert_eq!(table.total(), 1);
    assert_eq!(live.len(), 1);
}

#[test]
fn delivery_to_dropped_receiver_reports_closed() {
    let mut table = SubscriberTable::default();
    let sub = table.open("users", 4);
    let subscriber = table.subscribers("users")[0].clone();
    drop(sub);

    assert_eq!(subscriber.try_deliver(event(1)), Delivery::Closed);
}
