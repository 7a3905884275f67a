// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! NATS broker adapter

use super::{Broker, BrokerError, BrokerInfo, BrokerMessage, MessageStream};
use async_nats::connection::State;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use pulse_core::BrokerConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Pause between initial connection attempts, multiplied by the attempt number
const CONNECT_BACKOFF: Duration = Duration::from_millis(250);

/// Broker backed by a NATS client connection
#[derive(Clone)]
pub struct NatsBroker {
    client: async_nats::Client,
    url: String,
    closed: Arc<AtomicBool>,
}

impl NatsBroker {
    /// Connect with a bounded number of attempts.
    ///
    /// Once connected the client reconnects on its own, up to
    /// `max_reconnects` times (0 = forever). Exhausting the initial attempts
    /// is reported as [`BrokerError::Connect`]; choosing a fallback is up to
    /// the caller.
    pub async fn connect(config: &BrokerConfig, name: &str) -> Result<Self, BrokerError> {
        let attempts = config.connect_attempts.max(1);
        let mut reason = String::new();

        for attempt in 1..=attempts {
            let options = async_nats::ConnectOptions::new()
                .name(name)
                .connection_timeout(config.connect_timeout)
                .max_reconnects((config.max_reconnects > 0).then_some(config.max_reconnects))
                .event_callback(|event| async move {
                    tracing::info!(%event, "broker connection event");
                });

            match options.connect(config.url.as_str()).await {
                Ok(client) => {
                    tracing::info!(url = %config.url, attempt, "connected to broker");
                    return Ok(Self {
                        client,
                        url: config.url.clone(),
                        closed: Arc::new(AtomicBool::new(false)),
                    });
                }
                Err(e) => {
                    tracing::warn!(url = %config.url, attempt, attempts, error = %e, "broker connect failed");
                    reason = e.to_string();
                    if attempt < attempts {
                        tokio::time::sleep(CONNECT_BACKOFF * attempt).await;
                    }
                }
            }
        }

        Err(BrokerError::Connect {
            url: config.url.clone(),
            reason,
        })
    }

    /// The underlying client, for JetStream access
    pub fn client(&self) -> &async_nats::Client {
        &self.client
    }
}

#[async_trait]
impl Broker for NatsBroker {
    async fn publish(&self, subject: &str, payload: Bytes) -> Result<(), BrokerError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BrokerError::Closed);
        }
        self.client
            .publish(subject.to_string(), payload)
            .await
            .map_err(|e| BrokerError::Publish(e.to_string()))
    }

    async fn subscribe(&self, subject: &str) -> Result<MessageStream, BrokerError> {
        let subscriber = self
            .client
            .subscribe(subject.to_string())
            .await
            .map_err(|e| BrokerError::Subscribe(e.to_string()))?;

        Ok(subscriber
            .map(|message| BrokerMessage {
                subject: message.subject.to_string(),
                payload: message.payload,
            })
            .boxed())
    }

    fn info(&self) -> BrokerInfo {
        let connected = !self.closed.load(Ordering::Acquire)
            && matches!(self.client.connection_state(), State::Connected);
        BrokerInfo {
            connected,
            server_url: self.url.clone(),
            connection_id: self.client.server_info().client_id.to_string(),
        }
    }

    async fn close(&self) -> Result<(), BrokerError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.client
            .flush()
            .await
            .map_err(|e| BrokerError::Publish(e.to_string()))
    }
}
