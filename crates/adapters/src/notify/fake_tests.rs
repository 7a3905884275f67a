// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn fake_notify_records_calls() {
    let adapter = FakeNotifyAdapter::new();

    adapter.send("welcome", "Welcome, ada@example.com").await.unwrap();
    adapter.send("security", "3 failed logins for ada@example.com").await.unwrap();

    let calls = adapter.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].channel, "welcome");
    assert_eq!(calls[1].message, "3 failed logins for ada@example.com");
}

#[tokio::test]
async fn clones_share_recorded_calls() {
    let adapter = FakeNotifyAdapter::new();
    let clone = adapter.clone();

    clone.send("welcome", "hi").await.unwrap();
    assert_eq!(adapter.calls().len(), 1);
}

#[tokio::test]
async fn messages_on_filters_by_channel() {
    let adapter = FakeNotifyAdapter::new();
    adapter.send("welcome", "a").await.unwrap();
    adapter.send("security", "b").await.unwrap();
    adapter.send("welcome", "c").await.unwrap();

    assert_eq!(adapter.messages_on("welcome"), vec!["a", "c"]);
    assert!(adapter.messages_on("goodbye").is_empty());
}
