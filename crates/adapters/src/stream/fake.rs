// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake event stream for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{EventStream, StoredMessage, StreamError, StreamInfo};
use async_trait::async_trait;
use bytes::Bytes;
use pulse_core::SubjectPattern;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakeStreamState {
    messages: Vec<StoredMessage>,
    ensured: bool,
    fail_appends: bool,
    fail_ensure: bool,
    pruned: usize,
}

/// In-memory event stream. Clones share state.
#[derive(Clone, Default)]
pub struct FakeEventStream {
    state: Arc<Mutex<FakeStreamState>>,
}

impl FakeEventStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent appends fail
    pub fn set_fail_appends(&self, fail: bool) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).fail_appends = fail;
    }

    /// Make `ensure` fail, as an unreachable stream server would
    pub fn set_fail_ensure(&self, fail: bool) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).fail_ensure = fail;
    }

    pub fn is_ensured(&self) -> bool {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).ensured
    }

    /// All stored messages in append order
    pub fn messages(&self) -> Vec<StoredMessage> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .messages
            .clone()
    }

    /// Number of times `prune` was called
    pub fn prune_calls(&self) -> usize {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).pruned
    }
}

#[async_trait]
impl EventStream for FakeEventStream {
    async fn ensure(&self) -> Result<(), StreamError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.fail_ensure {
            return Err(StreamError::JetStream("fake stream unavailable".to_string()));
        }
        state.ensured = true;
        Ok(())
    }

    async fn append(&self, subject: &str, payload: Bytes) -> Result<u64, StreamError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if !state.ensured {
            return Err(StreamError::NotReady);
        }
        if state.fail_appends {
            return Err(StreamError::JetStream("fake append failure".to_string()));
        }
        let sequence = state.messages.len() as u64 + 1;
        state.messages.push(StoredMessage {
            sequence,
            subject: subject.to_string(),
            payload,
            timestamp_micros: 0,
        });
        Ok(sequence)
    }

    async fn read(
        &self,
        filter: &SubjectPattern,
        from_sequence: u64,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, StreamError> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Ok(state
            .messages
            .iter()
            .filter(|m| m.sequence >= from_sequence && filter.matches(&m.subject))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn info(&self) -> Result<StreamInfo, StreamError> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        Ok(StreamInfo {
            name: "FAKE".to_string(),
            messages: state.messages.len() as u64,
            first_sequence: state.messages.first().map_or(0, |m| m.sequence),
            last_sequence: state.messages.last().map_or(0, |m| m.sequence),
        })
    }

    async fn prune(&self) -> Result<usize, StreamError> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).pruned += 1;
        Ok(0)
    }
}
