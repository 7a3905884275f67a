// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the event bus

use pulse_adapters::{BrokerError, StreamError};
use pulse_core::ConfigError;
use thiserror::Error;

/// Errors returned by bus operations.
///
/// Only failures at the point of publish surface here. Full subscriber
/// channels and failing handlers are reported through logs and stats.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("transport error: {0}")]
    Transport(#[from] BrokerError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("stream error: {0}")]
    Stream(#[from] StreamError),
    #[error("bus has been shut down")]
    ShutDown,
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Error returned by an event handler
#[derive(Debug, Error)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

impl From<pulse_adapters::NotifyError> for HandlerError {
    fn from(err: pulse_adapters::NotifyError) -> Self {
        Self(err.to_string())
    }
}
