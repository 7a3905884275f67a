// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;

const DAY: Duration = Duration::from_secs(86_400);

fn all() -> SubjectPattern {
    SubjectPattern::default()
}

#[test]
fn append_and_read_back_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.log");
    let payload = br#"{"id":"e1","type":"user.created","data":{"user_id":42}}"#;

    let mut log = StreamLog::open(&path, DAY).unwrap();
    let seq = log.append("events.users.user.created", payload).unwrap();
    assert_eq!(seq, 1);

    let entries = log.read(&all(), 0, 10).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].subject, "events.users.user.created");
    assert_eq!(entries[0].payload.as_bytes(), payload);
}

#[test]
fn sequence_continues_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.log");

    {
        let mut log = StreamLog::open(&path, DAY).unwrap();
        assert_eq!(log.last_sequence(), None);
        log.append("events.auth.auth.failure", b"{}").unwrap();
        log.append("events.auth.auth.failure", b"{}").unwrap();
        assert_eq!(log.last_sequence(), Some(2));
    }

    let mut log = StreamLog::open(&path, DAY).unwrap();
    assert_eq!(log.next_sequence(), 3);
    assert_eq!(log.append("events.auth.auth.success", b"{}").unwrap(), 3);
}

#[test]
fn read_filters_by_subject_and_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let mut log = StreamLog::open(&dir.path().join("events.log"), DAY).unwrap();

    log.append("events.users.user.created", b"1").unwrap();
    log.append("events.roles.role.assigned", b"2").unwrap();
    log.append("events.users.user.deleted", b"3").unwrap();
    log.append("events.users.user.login", b"4").unwrap();

    let users = log.read(&SubjectPattern::new("events.users.>"), 0, 10).unwrap();
    let payloads: Vec<_> = users.iter().map(|e| e.payload.as_str()).collect();
    assert_eq!(payloads, vec!["1", "3", "4"]);

    let later = log.read(&SubjectPattern::new("events.users.>"), 3, 10).unwrap();
    assert_eq!(later.len(), 2);
    assert_eq!(later[0].sequence, 3);

    let limited = log.read(&all(), 0, 2).unwrap();
    assert_eq!(limited.len(), 2);
}

#[test]
fn non_utf8_payload_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut log = StreamLog::open(&dir.path().join("events.log"), DAY).unwrap();

    let result = log.append("events.users.user.created", &[0xff, 0xfe]);
    assert!(matches!(result, Err(StreamLogError::NonUtf8Payload)));
    assert_eq!(log.next_sequence(), 1);
}

#[test]
fn prune_drops_expired_entries_and_keeps_sequences() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.log");
    let mut log = StreamLog::open(&path, DAY).unwrap();

    log.append_at("events.system.system.startup", b"old", 1_000).unwrap();
    log.append_at("events.system.system.warning", b"old", 2_000).unwrap();
    log.append_at("events.system.system.shutdown", b"new", 5_000).unwrap();

    let removed = log.prune_before(3_000).unwrap();
    assert_eq!(removed, 2);

    let entries = log.read(&all(), 0, 10).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].sequence, 3);

    // Appends after pruning go to the rewritten file
    assert_eq!(log.append("events.system.system.startup", b"next").unwrap(), 4);
    assert_eq!(log.read(&all(), 0, 10).unwrap().len(), 2);
    assert!(!path.with_extension("prune").exists());
}

#[test]
fn prune_with_nothing_expired_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let mut log = StreamLog::open(&dir.path().join("events.log"), DAY).unwrap();
    log.append("events.users.user.created", b"{}").unwrap();

    assert_eq!(log.prune().unwrap(), 0);
    assert_eq!(log.read(&all(), 0, 10).unwrap().len(), 1);
}

#[test]
fn repair_truncates_torn_tail() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.log");
    {
        let mut log = StreamLog::open(&path, DAY).unwrap();
        log.append("events.users.user.created", b"{}").unwrap();
    }
    let intact = std::fs::metadata(&path).unwrap().len();

    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(br#"{"sequence":2,"timestamp_mic"#).unwrap();
    drop(file);

    let removed = StreamLog::repair(&path).unwrap();
    assert!(removed > 0);
    assert_eq!(std::fs::metadata(&path).unwrap().len(), intact);

    let mut log = StreamLog::open(&path, DAY).unwrap();
    assert_eq!(log.append("events.users.user.deleted", b"{}").unwrap(), 2);
}

#[test]
fn repair_on_intact_or_missing_file_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.log");
    assert_eq!(StreamLog::repair(&path).unwrap(), 0);

    let mut log = StreamLog::open(&path, DAY).unwrap();
    log.append("events.users.user.created", b"{}").unwrap();
    assert_eq!(StreamLog::repair(&path).unwrap(), 0);
}

#[test]
fn open_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("events.log");
    let log = StreamLog::open(&path, DAY).unwrap();
    assert_eq!(log.path(), path.as_path());
    assert!(path.exists());
}

#[test]
fn prune_refuses_to_drop_entries_after_corruption() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.log");
    let mut log = StreamLog::open(&path, DAY).unwrap();
    log.append_at("events.users.user.created", b"old", 1_000).unwrap();

    let mut bad = StreamEntry::new_with_timestamp(2, 5_000, "events.users.user.updated", "{}".to_string());
    bad.payload = "{\"tampered\":true}".to_string();
    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    writeln!(file, "{}", bad.to_line().unwrap()).unwrap();
    let good = StreamEntry::new_with_timestamp(3, 6_000, "events.users.user.deleted", "{}".to_string());
    writeln!(file, "{}", good.to_line().unwrap()).unwrap();
    drop(file);
    let before = std::fs::read(&path).unwrap();

    let result = log.prune_before(3_000);
    assert!(matches!(result, Err(StreamLogError::Read(_))));
    assert_eq!(std::fs::read(&path).unwrap(), before);
    assert!(!path.with_extension("prune").exists());
}

#[test]
fn counts_track_appends_prunes_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.log");
    let mut log = StreamLog::open(&path, DAY).unwrap();
    assert_eq!(log.message_count(), 0);
    assert_eq!(log.first_sequence(), None);

    log.append_at("events.auth.auth.failure", b"1", 1_000).unwrap();
    log.append_at("events.auth.auth.failure", b"2", 2_000).unwrap();
    log.append_at("events.auth.auth.success", b"3", 9_000).unwrap();
    assert_eq!(log.message_count(), 3);
    assert_eq!(log.first_sequence(), Some(1));

    log.prune_before(5_000).unwrap();
    assert_eq!(log.message_count(), 1);
    assert_eq!(log.first_sequence(), Some(3));

    let reopened = StreamLog::open(&path, DAY).unwrap();
    assert_eq!(reopened.message_count(), 1);
    assert_eq!(reopened.first_sequence(), Some(3));
    assert_eq!(reopened.last_sequence(), Some(3));
}
