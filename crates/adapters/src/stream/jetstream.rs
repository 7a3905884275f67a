// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! NATS JetStream event stream

use super::{EventStream, StoredMessage, StreamError, StreamInfo};
use async_nats::jetstream::{self, consumer, stream};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use pulse_core::{SubjectPattern, SUBJECT_WILDCARD};
use std::time::Duration;

/// Upper bound on messages pulled per fetch request
const FETCH_BATCH: usize = 256;

/// Idle time after which the server removes a replay consumer
const CONSUMER_INACTIVE: Duration = Duration::from_secs(30);

/// Event stream stored in a JetStream stream bound to `events.>`.
///
/// The server expires messages older than the retention window itself, and
/// captures every core publish on the stream's subjects.
#[derive(Clone)]
pub struct JetStreamLog {
    context: jetstream::Context,
    name: String,
    retention: Duration,
}

impl JetStreamLog {
    pub fn new(client: async_nats::Client, name: impl Into<String>, retention: Duration) -> Self {
        Self {
            context: jetstream::new(client),
            name: name.into(),
            retention,
        }
    }

    async fn stream(&self) -> Result<stream::Stream, StreamError> {
        self.context
            .get_stream(&self.name)
            .await
            .map_err(|e| StreamError::JetStream(e.to_string()))
    }
}

#[async_trait]
impl EventStream for JetStreamLog {
    async fn ensure(&self) -> Result<(), StreamError> {
        let config = stream::Config {
            name: self.name.clone(),
            subjects: vec![SUBJECT_WILDCARD.to_string()],
            max_age: self.retention,
            ..Default::default()
        };
        self.context
            .get_or_create_stream(config)
            .await
            .map_err(|e| StreamError::JetStream(e.to_string()))?;
        tracing::debug!(stream = %self.name, retention = ?self.retention, "stream ready");
        Ok(())
    }

    async fn append(&self, subject: &str, payload: Bytes) -> Result<u64, StreamError> {
        let ack = self
            .context
            .publish(subject.to_string(), payload)
            .await
            .map_err(|e| StreamError::JetStream(e.to_string()))?
            .await
            .map_err(|e| StreamError::JetStream(e.to_string()))?;
        Ok(ack.sequence)
    }

    async fn read(
        &self,
        filter: &SubjectPattern,
        from_sequence: u64,
        limit: usize,
    ) -> Result<Vec<StoredMessage>, StreamError> {
        let deliver_policy = if from_sequence <= 1 {
            consumer::DeliverPolicy::All
        } else {
            consumer::DeliverPolicy::ByStartSequence {
                start_sequence: from_sequence,
            }
        };

        let consumer = self
            .stream()
            .await?
            .create_consumer(consumer::pull::Config {
                filter_subject: filter.as_str().to_string(),
                deliver_policy,
                ack_policy: consumer::AckPolicy::None,
                inactive_threshold: CONSUMER_INACTIVE,
                ..Default::default()
            })
            .await
            .map_err(|e| StreamError::JetStream(e.to_string()))?;

        let mut out = Vec::new();
        while out.len() < limit {
            let want = (limit - out.len()).min(FETCH_BATCH);
            let mut batch = consumer
                .fetch()
                .max_messages(want)
                .messages()
                .await
                .map_err(|e| StreamError::JetStream(e.to_string()))?;

            let before = out.len();
            while let Some(message) = batch.next().await {
                let message = message.map_err(|e| StreamError::JetStream(e.to_string()))?;
                let info = message
                    .info()
                    .map_err(|e| StreamError::JetStream(e.to_string()))?;
                let timestamp_micros = (info.published.unix_timestamp_nanos() / 1_000).max(0) as u64;
                out.push(StoredMessage {
                    sequence: info.stream_sequence,
                    subject: message.subject.to_string(),
                    payload: message.payload.clone(),
                    timestamp_micros,
                });
            }
            if out.len() - before < want {
                break;
            }
        }
        Ok(out)
    }

    async fn info(&self) -> Result<StreamInfo, StreamError> {
        let mut stream = self.stream().await?;
        let info = stream
            .info()
            .await
            .map_err(|e| StreamError::JetStream(e.to_string()))?;
        Ok(StreamInfo {
            name: self.name.clone(),
            messages: info.state.messages,
            first_sequence: info.state.first_sequence,
            last_sequence: info.state.last_sequence,
        })
    }

    fn captures_broker_traffic(&self) -> bool {
        true
    }
}
