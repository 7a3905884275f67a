// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message broker adapters

mod nats;

pub use nats::NatsBroker;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeBroker;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde::Serialize;
use thiserror::Error;

/// Errors from broker operations
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("could not connect to {url}: {reason}")]
    Connect { url: String, reason: String },
    #[error("publish failed: {0}")]
    Publish(String),
    #[error("subscribe failed: {0}")]
    Subscribe(String),
    #[error("broker connection closed")]
    Closed,
}

/// A message delivered by the broker
#[derive(Debug, Clone, PartialEq)]
pub struct BrokerMessage {
    pub subject: String,
    pub payload: Bytes,
}

/// Connection diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokerInfo {
    pub connected: bool,
    pub server_url: String,
    pub connection_id: String,
}

/// Stream of messages from a broker subscription
pub type MessageStream = BoxStream<'static, BrokerMessage>;

/// Adapter for a subject-based message broker
#[async_trait]
pub trait Broker: Clone + Send + Sync + 'static {
    /// Fire-and-forget publish to a subject
    async fn publish(&self, subject: &str, payload: Bytes) -> Result<(), BrokerError>;

    /// Subscribe to a subject pattern (`*` and `>` wildcards)
    async fn subscribe(&self, subject: &str) -> Result<MessageStream, BrokerError>;

    /// Point-in-time connection diagnostics
    fn info(&self) -> BrokerInfo;

    /// Flush pending messages and release the connection
    async fn close(&self) -> Result<(), BrokerError>;
}
