// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::broker::{Broker, BrokerError, BrokerInfo, MessageStream};
use crate::stream::{EventStream, StoredMessage, StreamError, StreamInfo};
use async_trait::async_trait;
use bytes::Bytes;
use pulse_core::SubjectPattern;
use tracing::Instrument;

/// Wrapper that adds tracing to any Broker
#[derive(Clone)]
pub struct TracedBroker<B> {
    inner: B,
}

impl<B> TracedBroker<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }
}

#[async_trait]
impl<B: Broker> Broker for TracedBroker<B> {
    async fn publish(&self, subject: &str, payload: Bytes) -> Result<(), BrokerError> {
        let span = tracing::info_span!("broker.publish", subject);
        async {
            tracing::trace!(bytes = payload.len(), "publishing");
            let result = self.inner.publish(subject, payload).await;
            if let Err(e) = &result {
                tracing::error!(error = %e, "publish failed");
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn subscribe(&self, subject: &str) -> Result<MessageStream, BrokerError> {
        let span = tracing::info_span!("broker.subscribe", subject);
        async {
            let result = self.inner.subscribe(subject).await;
            match &result {
                Ok(_) => tracing::info!("subscribed"),
                Err(e) => tracing::error!(error = %e, "subscribe failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    fn info(&self) -> BrokerInfo {
        self.inner.info()
    }

    async fn close(&self) -> Result<(), BrokerError> {
        let span = tracing::info_span!("broker.close");
        async {
            let result = self.inner.close().await;
            match &result {
                Ok(()) => tracing::info!("broker closed"),
                Err(e) => tracing::warn!(error = %e, "close failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any EventStream
#[derive(Clone)]
pub struct TracedEventStream<S> {
    inner: S,
}

impl<S> TracedEventStream<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: EventStream> EventStream for TracedEventStream<S> {
    async fn ensure(&self) -> Result<(), StreamError> {
        let span = tracing::info_span!("stream.ensure");
        async {
            let start = std::time::Instant::now();
            let result = self.inner.ensure().await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "stream ready"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "ensure failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn append(&self, subject: &str, payload: Bytes) -> Result<u64, StreamError> {
        let span = tracing::debug_span!("stream.append", subject);
        async {
            let result = self.inner.append(subject, payload).await;
            match &result {
                Ok(sequence) => tracing::trace!(sequence, "appended"),
                Err(e) => tracing::warn!(error = %e, "append failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn read(
        &self,
        filter: &SubjectPattern,
        from_sequence: u64,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, StreamError> {
        let span = tracing::info_span!("stream.read", filter = %filter, from_sequence, limit);
        async {
            let start = std::time::Instant::now();
            let result = self.inner.read(filter, from_sequence, limit).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(messages) => tracing::info!(count = messages.len(), elapsed_ms, "read complete"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "read failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn info(&self) -> Result<StreamInfo, StreamError> {
        self.inner.info().await
    }

    fn captures_broker_traffic(&self) -> bool {
        self.inner.captures_broker_traffic()
    }

    async fn prune(&self) -> Result<usize, StreamError> {
        let span = tracing::info_span!("stream.prune");
        async {
            let result = self.inner.prune().await;
            match &result {
                Ok(0) => {}
                Ok(removed) => tracing::info!(removed, "pruned expired messages"),
                Err(e) => tracing::warn!(error = %e, "prune failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
