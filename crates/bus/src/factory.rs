// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backend selection at startup

use crate::bus::EventBus;
use crate::durable::DurableBus;
use crate::error::BusError;
use crate::memory::InProcessBus;
use pulse_adapters::{
    AnyEventStream, FileStreamLog, JetStreamLog, NatsBroker, TracedBroker, TracedEventStream,
};
use pulse_core::{Backend, Config, StreamBackend};
use std::sync::Arc;

/// Durable bus as built from configuration
pub type ConfiguredDurableBus = DurableBus<TracedBroker<NatsBroker>, TracedEventStream<AnyEventStream>>;

/// Build the bus named by `config.bus.backend`.
///
/// A durable bus that cannot reach its broker is an error; whether to fall
/// back to [`InProcessBus`] is the caller's decision.
pub async fn connect(config: &Config) -> Result<Arc<dyn EventBus>, BusError> {
    match config.bus.backend {
        Backend::InProcess => {
            tracing::info!(source = %config.source, "using in-process bus");
            Ok(Arc::new(InProcessBus::new(&config.bus, config.source.clone())))
        }
        Backend::Durable => Ok(Arc::new(connect_durable(config).await?)),
    }
}

/// Connect to the broker, ensure the stream, and start a durable bus
pub async fn connect_durable(config: &Config) -> Result<ConfiguredDurableBus, BusError> {
    let broker = NatsBroker::connect(&config.broker, &config.source).await?;
    let stream = stream_for(config, &broker);
    DurableBus::start(
        config,
        TracedBroker::new(broker),
        TracedEventStream::new(stream),
    )
    .await
}

/// Open the configured persistent stream for reading.
///
/// The JetStream backend connects to the broker; the file backend does not.
/// The stream is ensured before it is returned.
pub async fn open_stream(config: &Config) -> Result<TracedEventStream<AnyEventStream>, BusError> {
    let stream = match config.stream.backend {
        StreamBackend::File => AnyEventStream::File(file_stream(config)),
        StreamBackend::JetStream => {
            let broker = NatsBroker::connect(&config.broker, &config.source).await?;
            stream_for(config, &broker)
        }
    };
    let stream = TracedEventStream::new(stream);
    pulse_adapters::EventStream::ensure(&stream).await?;
    Ok(stream)
}

fn stream_for(config: &Config, broker: &NatsBroker) -> AnyEventStream {
    match config.stream.backend {
        StreamBackend::JetStream => AnyEventStream::JetStream(JetStreamLog::new(
            broker.client().clone(),
            config.stream.name.clone(),
            config.stream.retention,
        )),
        StreamBackend::File => AnyEventStream::File(file_stream(config)),
    }
}

fn file_stream(config: &Config) -> FileStreamLog {
    FileStreamLog::new(
        config.stream.name.clone(),
        config.stream.path.clone(),
        config.stream.retention,
    )
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
