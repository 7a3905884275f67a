// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bus configuration
//!
//! Loaded from TOML; every field has a default so a missing file or a
//! partial file is valid. A handful of environment variables override the
//! file for container deployments.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Slots in each subscriber channel
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 100;
/// Upper bound on a single handler invocation
pub const DEFAULT_HANDLER_TIMEOUT: Duration = Duration::from_secs(30);
/// How often closed subscriber channels are swept
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);
/// Concurrent handler invocations before new ones are rejected
pub const DEFAULT_MAX_IN_FLIGHT_HANDLERS: usize = 1024;
/// How long the persistent stream keeps events
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(24 * 60 * 60);

/// Errors loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Which bus backend to construct at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    InProcess,
    Durable,
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_process" | "memory" => Ok(Backend::InProcess),
            "durable" | "nats" => Ok(Backend::Durable),
            other => Err(format!("unknown backend: {}", other)),
        }
    }
}

/// Where the durable bus persists events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamBackend {
    #[default]
    #[serde(rename = "jetstream")]
    JetStream,
    File,
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identifies this process in every published event
    pub source: String,
    pub bus: BusConfig,
    pub broker: BrokerConfig,
    pub stream: StreamConfig,
}

/// Local fan-out and handler dispatch settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    pub backend: Backend,
    pub subscriber_capacity: usize,
    #[serde(with = "humantime_serde")]
    pub handler_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub sweep_interval: Duration,
    /// 0 means unbounded (one task per invocation)
    pub max_in_flight_handlers: usize,
    /// 0 disables dedup of broker echoes
    pub dedup_window: usize,
}

/// Message broker connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub url: String,
    /// Initial connection attempts before construction fails
    pub connect_attempts: u32,
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
    /// Reconnect attempts after the connection has been established
    pub max_reconnects: usize,
}

/// Persistent stream settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub backend: StreamBackend,
    pub name: String,
    #[serde(with = "humantime_serde")]
    pub retention: Duration,
    /// File backend only
    pub path: PathBuf,
    /// File backend only: how often expired entries are pruned
    #[serde(with = "humantime_serde")]
    pub prune_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: "pulse".to_string(),
            bus: BusConfig::default(),
            broker: BrokerConfig::default(),
            stream: StreamConfig::default(),
        }
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            backend: Backend::InProcess,
            subscriber_capacity: DEFAULT_SUBSCRIBER_CAPACITY,
            handler_timeout: DEFAULT_HANDLER_TIMEOUT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            max_in_flight_handlers: DEFAULT_MAX_IN_FLIGHT_HANDLERS,
            dedup_window: 0,
        }
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            url: "nats://127.0.0.1:4222".to_string(),
            connect_attempts: 3,
            connect_timeout: Duration::from_secs(2),
            max_reconnects: 60,
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            backend: StreamBackend::JetStream,
            name: "EVENTS".to_string(),
            retention: DEFAULT_RETENTION,
            path: PathBuf::from("events.log"),
            prune_interval: Duration::from_secs(300),
        }
    }
}

impl Config {
    /// Load from a TOML file, falling back to defaults when it does not exist,
    /// then apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Self::default()
            }
            Err(e) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML text without touching the environment
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Apply `PULSE_*` overrides from the given lookup
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(backend) = lookup("PULSE_BACKEND") {
            self.bus.backend = backend.parse().map_err(|reason| ConfigError::Invalid {
                field: "PULSE_BACKEND",
                reason,
            })?;
        }
        if let Some(url) = lookup("PULSE_BROKER_URL") {
            self.broker.url = url;
        }
        if let Some(source) = lookup("PULSE_SOURCE") {
            self.source = source;
        }
        Ok(())
    }

    /// Reject values the bus cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.trim().is_empty() {
            return Err(invalid("source", "must not be empty"));
        }
        if self.bus.subscriber_capacity == 0 {
            return Err(invalid("bus.subscriber_capacity", "must be at least 1"));
        }
        if self.bus.handler_timeout.is_zero() {
            return Err(invalid("bus.handler_timeout", "must be positive"));
        }
        if self.bus.sweep_interval.is_zero() {
            return Err(invalid("bus.sweep_interval", "must be positive"));
        }
        if self.bus.backend == Backend::Durable {
            if self.broker.connect_attempts == 0 {
                return Err(invalid("broker.connect_attempts", "must be at least 1"));
            }
            if self.stream.retention.is_zero() {
                return Err(invalid("stream.retention", "must be positive"));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
