// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;
use yare::parameterized;

fn write_entries(path: &Path, count: u64) {
    let mut file = std::fs::File::create(path).unwrap();
    for seq in 1..=count {
        let entry = StreamEntry::new(seq, "events.users.user.created", format!("{{\"n\":{}}}", seq));
        writeln!(file, "{}", entry.to_line().unwrap()).unwrap();
    }
}

#[test]
fn missing_file_reads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let reader = StreamReader::open(&dir.path().join("nope.log"));
    assert_eq!(reader.entries().unwrap().count(), 0);
}

#[parameterized(
    from_start = { 0, 5 },
    from_first = { 1, 5 },
    from_middle = { 3, 3 },
    past_end = { 9, 0 },
)]
fn entries_from_skips_earlier_sequences(from: u64, expected: usize) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.log");
    write_entries(&path, 5);

    let reader = StreamReader::open(&path);
    let entries: Vec<_> = reader.entries_from(from).unwrap().collect();
    assert_eq!(entries.len(), expected);
    assert!(entries.iter().all(|e| e.is_ok()));
}

#[test]
fn checksum_mismatch_stops_iteration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.log");
    write_entries(&path, 2);

    let mut bad = StreamEntry::new(3, "events.users.user.created", "{}".to_string());
    bad.payload = "{\"tampered\":true}".to_string();
    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    writeln!(file, "{}", bad.to_line().unwrap()).unwrap();
    write_entries_append(&path, 4);

    let results: Vec<_> = StreamReader::open(&path).entries().unwrap().collect();
    assert!(results[0].is_ok());
    assert!(results[1].is_ok());
    assert!(matches!(
        results[2],
        Err(StreamReadError::ChecksumMismatch { line: 3 })
    ));

    // read() hides the corruption and returns only the valid prefix
    let read = StreamReader::open(&path)
        .read(&SubjectPattern::default(), 0, 100)
        .unwrap();
    assert_eq!(read.len(), 2);
}

fn write_entries_append(path: &Path, seq: u64) {
    let mut file = std::fs::OpenOptions::new().append(true).open(path).unwrap();
    let entry = StreamEntry::new(seq, "events.users.user.created", "{}".to_string());
    writeln!(file, "{}", entry.to_line().unwrap()).unwrap();
}

#[test]
fn truncated_final_line_is_corruption() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.log");
    write_entries(&path, 1);

    let entry = StreamEntry::new(2, "events.users.user.created", "{}".to_string());
    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    write!(file, "{}", entry.to_line().unwrap()).unwrap();

    let mut iter = StreamReader::open(&path).entries().unwrap();
    assert!(iter.next().unwrap().is_ok());
    assert!(matches!(
        iter.next(),
        Some(Err(StreamReadError::Corrupted { line: 2, .. }))
    ));
}

#[test]
fn blank_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.log");
    write_entries(&path, 1);
    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    writeln!(file).unwrap();
    drop(file);
    write_entries_append(&path, 2);

    let entries: Vec<_> = StreamReader::open(&path).entries().unwrap().collect();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.is_ok()));
}
