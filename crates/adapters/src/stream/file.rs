// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed event stream

use super::{EventStream, StoredMessage, StreamError, StreamInfo};
use async_trait::async_trait;
use bytes::Bytes;
use pulse_core::SubjectPattern;
use pulse_storage::StreamLog;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Event stream stored in a local JSON-lines file.
///
/// Single-host only: two processes appending to the same file will
/// interleave sequence numbers.
#[derive(Clone)]
pub struct FileStreamLog {
    name: String,
    path: PathBuf,
    retention: Duration,
    log: Arc<Mutex<Option<StreamLog>>>,
}

impl FileStreamLog {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, retention: Duration) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            retention,
            log: Arc::new(Mutex::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` against the open log on the blocking pool
    async fn with_log<T, F>(&self, f: F) -> Result<T, StreamError>
    where
        T: Send + 'static,
        F: FnOnce(&mut StreamLog) -> Result<T, StreamError> + Send + 'static,
    {
        let log = Arc::clone(&self.log);
        tokio::task::spawn_blocking(move || {
            let mut guard = log.lock().unwrap_or_else(|e| e.into_inner());
            match guard.as_mut() {
                Some(log) => f(log),
                None => Err(StreamError::NotReady),
            }
        })
        .await
        .map_err(|e| StreamError::Task(e.to_string()))?
    }
}

#[async_trait]
impl EventStream for FileStreamLog {
    async fn ensure(&self) -> Result<(), StreamError> {
        let log = Arc::clone(&self.log);
        let path = self.path.clone();
        let retention = self.retention;
        tokio::task::spawn_blocking(move || {
            let mut guard = log.lock().unwrap_or_else(|e| e.into_inner());
            if guard.is_some() {
                return Ok(());
            }
            let repaired = StreamLog::repair(&path)?;
            if repaired > 0 {
                tracing::warn!(path = %path.display(), bytes = repaired, "repaired stream log");
            }
            *guard = Some(StreamLog::open(&path, retention)?);
            Ok(())
        })
        .await
        .map_err(|e| StreamError::Task(e.to_string()))?
    }

    async fn append(&self, subject: &str, payload: Bytes) -> Result<u64, StreamError> {
        let subject = subject.to_string();
        self.with_log(move |log| Ok(log.append(&subject, &payload)?))
            .await
    }

    async fn read(
        &self,
        filter: &SubjectPattern,
        from_sequence: u64,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, StreamError> {
        let filter = filter.clone();
        self.with_log(move |log| {
            let entries = log.read(&filter, from_sequence, limit)?;
            Ok(entries
                .into_iter()
                .map(|entry| StoredMessage {
                    sequence: entry.sequence,
                    subject: entry.subject,
                    payload: Bytes::from(entry.payload),
                    timestamp_micros: entry.timestamp_micros,
                })
                .collect())
        })
        .await
    }

    async fn info(&self) -> Result<StreamInfo, StreamError> {
        let name = self.name.clone();
        self.with_log(move |log| {
            Ok(StreamInfo {
                name,
                messages: log.message_count(),
                first_sequence: log.first_sequence().unwrap_or(0),
                last_sequence: log.last_sequence().unwrap_or(0),
            })
        })
        .await
    }

    async fn prune(&self) -> Result<usize, StreamError> {
        self.with_log(|log| Ok(log.prune()?)).await
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
