// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake broker for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Broker, BrokerError, BrokerInfo, BrokerMessage, MessageStream};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use pulse_core::SubjectPattern;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

#[derive(Default)]
struct FakeBrokerState {
    subscribers: Vec<(SubjectPattern, mpsc::UnboundedSender<BrokerMessage>)>,
    published: Vec<BrokerMessage>,
    fail_publish: bool,
    disconnected: bool,
    closed: bool,
}

/// In-memory broker that loops published messages back to subscribers.
///
/// Clones share state, so a test can keep one handle to inspect traffic while
/// the bus under test owns another.
#[derive(Clone, Default)]
pub struct FakeBroker {
    state: Arc<Mutex<FakeBrokerState>>,
}

impl FakeBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message accepted by `publish`, in order
    pub fn published(&self) -> Vec<BrokerMessage> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .published
            .clone()
    }

    /// Make subsequent publishes fail with [`BrokerError::Publish`]
    pub fn set_fail_publish(&self, fail: bool) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).fail_publish = fail;
    }

    /// Simulate a lost connection: info reports disconnected and open
    /// subscriptions end.
    pub fn disconnect(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.disconnected = true;
        state.subscribers.clear();
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.subscribers.retain(|(_, tx)| !tx.is_closed());
        state.subscribers.len()
    }
}

#[async_trait]
impl Broker for FakeBroker {
    async fn publish(&self, subject: &str, payload: Bytes) -> Result<(), BrokerError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.closed {
            return Err(BrokerError::Closed);
        }
        if state.fail_publish || state.disconnected {
            return Err(BrokerError::Publish("fake broker unavailable".to_string()));
        }

        let message = BrokerMessage {
            subject: subject.to_string(),
            payload,
        };
        state.published.push(message.clone());
        state.subscribers.retain(|(pattern, tx)| {
            if !pattern.matches(subject) {
                return !tx.is_closed();
            }
            tx.send(message.clone()).is_ok()
        });
        Ok(())
    }

    async fn subscribe(&self, subject: &str) -> Result<MessageStream, BrokerError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.closed || state.disconnected {
            return Err(BrokerError::Subscribe("fake broker unavailable".to_string()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        state.subscribers.push((SubjectPattern::new(subject), tx));

        Ok(futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|message| (message, rx))
        })
        .boxed())
    }

    fn info(&self) -> BrokerInfo {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        BrokerInfo {
            connected: !state.closed && !state.disconnected,
            server_url: "fake://broker".to_string(),
            connection_id: "fake".to_string(),
        }
    }

    async fn close(&self) -> Result<(), BrokerError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.closed = true;
        state.subscribers.clear();
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
