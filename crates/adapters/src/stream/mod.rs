// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistent event stream adapters
//!
//! A stream is a retention-bounded, append-only record of every broker
//! message under `events.>`. Live delivery never reads from it; replay and
//! audit consumers do.

mod file;
mod jetstream;

pub use file::FileStreamLog;
pub use jetstream::JetStreamLog;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeEventStream;

use async_trait::async_trait;
use bytes::Bytes;
use pulse_core::SubjectPattern;
use pulse_storage::StreamLogError;
use serde::Serialize;
use thiserror::Error;

/// Errors from stream operations
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("stream not ready: call ensure() first")]
    NotReady,
    #[error("stream log error: {0}")]
    Log(#[from] StreamLogError),
    #[error("jetstream error: {0}")]
    JetStream(String),
    #[error("stream task failed: {0}")]
    Task(String),
}

/// A message read back from the stream
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMessage {
    pub sequence: u64,
    pub subject: String,
    pub payload: Bytes,
    pub timestamp_micros: u64,
}

/// Point-in-time stream state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamInfo {
    pub name: String,
    pub messages: u64,
    pub first_sequence: u64,
    pub last_sequence: u64,
}

/// Adapter for a persistent, retention-bounded message stream
#[async_trait]
pub trait EventStream: Clone + Send + Sync + 'static {
    /// Create the stream if missing. Calling this on an existing stream is not an error.
    async fn ensure(&self) -> Result<(), StreamError>;

    /// Append one message, returning its stream sequence
    async fn append(&self, subject: &str, payload: Bytes) -> Result<u64, StreamError>;

    /// Read up to `limit` messages matching `filter`, starting at `from_sequence`
    async fn read(
        &self,
        filter: &SubjectPattern,
        from_sequence: u64,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, StreamError>;

    async fn info(&self) -> Result<StreamInfo, StreamError>;

    /// True when the stream records broker traffic on its own, so a broker
    /// publish is already an append.
    fn captures_broker_traffic(&self) -> bool {
        false
    }

    /// Drop messages past retention. Backends that expire on their own return 0.
    async fn prune(&self) -> Result<usize, StreamError> {
        Ok(0)
    }
}

/// Stream backend selected from configuration
#[derive(Clone)]
pub enum AnyEventStream {
    JetStream(JetStreamLog),
    File(FileStreamLog),
}

#[async_trait]
impl EventStream for AnyEventStream {
    async fn ensure(&self) -> Result<(), StreamError> {
        match self {
            Self::JetStream(s) => s.ensure().await,
            Self::File(s) => s.ensure().await,
        }
    }

    async fn append(&self, subject: &str, payload: Bytes) -> Result<u64, StreamError> {
        match self {
            Self::JetStream(s) => s.append(subject, payload).await,
            Self::File(s) => s.append(subject, payload).await,
        }
    }

    async fn read(
        &self,
        filter: &SubjectPattern,
        from_sequence: u64,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, StreamError> {
        match self {
            Self::JetStream(s) => s.read(filter, from_sequence, limit).await,
            Self::File(s) => s.read(filter, from_sequence, limit).await,
        }
    }

    async fn info(&self) -> Result<StreamInfo, StreamError> {
        match self {
            Self::JetStream(s) => s.info().await,
            Self::File(s) => s.info().await,
        }
    }

    fn captures_broker_traffic(&self) -> bool {
        match self {
            Self::JetStream(s) => s.captures_broker_traffic(),
            Self::File(s) => s.captures_broker_traffic(),
        }
    }

    async fn prune(&self) -> Result<usize, StreamError> {
        match self {
            Self::JetStream(s) => s.prune().await,
            Self::File(s) => s.prune().await,
        }
    }
}
