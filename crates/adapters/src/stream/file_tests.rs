// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const DAY: Duration = Duration::from_secs(86_400);

#[tokio::test]
async fn operations_before_ensure_are_not_ready() {
    let dir = tempfile::tempdir().unwrap();
    let stream = FileStreamLog::new("EVENTS", dir.path().join("events.log"), DAY);

    let result = stream.append("events.users.user.created", Bytes::new()).await;
    assert!(matches!(result, Err(StreamError::NotReady)));
}

#[tokio::test]
async fn ensure_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let stream = FileStreamLog::new("EVENTS", dir.path().join("events.log"), DAY);

    stream.ensure().await.unwrap();
    stream.append("events.users.user.created", Bytes::from_static(b"{}")).await.unwrap();
    stream.ensure().await.unwrap();

    assert_eq!(stream.info().await.unwrap().messages, 1);
}

#[tokio::test]
async fn append_read_and_info() {
    let dir = tempfile::tempdir().unwrap();
    let stream = FileStreamLog::new("EVENTS", dir.path().join("events.log"), DAY);
    stream.ensure().await.unwrap();

    let payload = Bytes::from_static(br#"{"id":"e1","type":"user.created"}"#);
    assert_eq!(stream.append("events.users.user.created", payload.clone()).await.unwrap(), 1);
    assert_eq!(
        stream.append("events.auth.auth.failure", Bytes::from_static(b"{}")).await.unwrap(),
        2
    );

    let users = stream
        .read(&SubjectPattern::new("events.users.>"), 0, 10)
        .await
        .unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].payload, payload);
    assert_eq!(users[0].sequence, 1);

    let info = stream.info().await.unwrap();
    assert_eq!(info.name, "EVENTS");
    assert_eq!(info.messages, 2);
    assert_eq!(info.first_sequence, 1);
    assert_eq!(info.last_sequence, 2);
}

#[tokio::test]
async fn clones_share_the_open_log() {
    let dir = tempfile::tempdir().unwrap();
    let stream = FileStreamLog::new("EVENTS", dir.path().join("events.log"), DAY);
    let other = stream.clone();
    stream.ensure().await.unwrap();

    other.append("events.system.system.startup", Bytes::from_static(b"{}")).await.unwrap();
    assert_eq!(stream.info().await.unwrap().last_sequence, 1);
}

#[tokio::test]
async fn prune_with_fresh_entries_removes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let stream = FileStreamLog::new("EVENTS", dir.path().join("events.log"), DAY);
    stream.ensure().await.unwrap();
    stream.append("events.system.system.startup", Bytes::from_static(b"{}")).await.unwrap();

    assert_eq!(stream.prune().await.unwrap(), 0);
}

#[tokio::test]
async fn info_after_reopen_reflects_existing_entries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.log");
    {
        let stream = FileStreamLog::new("EVENTS", path.clone(), DAY);
        stream.ensure().await.unwrap();
        for _ in 0..3 {
            stream.append("events.roles.role.created", Bytes::from_static(b"{}")).await.unwrap();
        }
    }

    let reopened = FileStreamLog::new("EVENTS", path, DAY);
    reopened.ensure().await.unwrap();
    let info = reopened.info().await.unwrap();
    assert_eq!(info.messages, 3);
    assert_eq!(info.first_sequence, 1);
    assert_eq!(info.last_sequence, 3);
}
