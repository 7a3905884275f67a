// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown, fallback.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use pulse_adapters::{LogNotifyAdapter, NotifyAdapter};
use pulse_bus::{BusError, EventBus, InProcessBus};
use pulse_core::{Backend, Config, ConfigError, EventData};
use pulse_service::{register_default_handlers, DefaultHandlers, EventService};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "pulse.toml";

/// How often bus stats are written to the log
pub const DEFAULT_STATS_INTERVAL: Duration = Duration::from_secs(60);

/// Daemon paths and intervals
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// TOML bus configuration; a missing file means defaults
    pub config_path: PathBuf,
    /// Daemon log file
    pub log_path: PathBuf,
    pub stats_interval: Duration,
}

impl DaemonConfig {
    /// Resolve paths from an optional config argument.
    ///
    /// The log goes next to the config file unless `PULSE_LOG` is set.
    pub fn from_arg(arg: Option<&str>) -> Self {
        let config_path = PathBuf::from(arg.unwrap_or(DEFAULT_CONFIG_FILE));
        let log_path = std::env::var_os("PULSE_LOG")
            .map(PathBuf::from)
            .unwrap_or_else(|| config_path.with_file_name("pulsed.log"));
        Self {
            config_path,
            log_path,
            stats_interval: DEFAULT_STATS_INTERVAL,
        }
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not determine log directory for {0}")]
    NoLogDir(PathBuf),

    #[error("Bus error: {0}")]
    Bus(#[from] BusError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A running daemon
pub struct Daemon {
    pub config: Config,
    pub bus: Arc<dyn EventBus>,
    pub service: EventService,
    pub handlers: DefaultHandlers,
    /// Backend actually in use after any fallback
    pub backend: Backend,
    pub started_at: Instant,
}

impl Daemon {
    /// Log a one-line stats summary
    pub fn log_stats(&self) {
        let stats = self.bus.stats();
        info!(
            backend = ?self.backend,
            uptime_secs = self.started_at.elapsed().as_secs(),
            subscribers = stats.total_subscribers,
            handlers = stats.total_handlers,
            in_flight = stats.dispatch.in_flight,
            completed = stats.dispatch.completed,
            failed = stats.dispatch.failed,
            timed_out = stats.dispatch.timed_out,
            rejected = stats.dispatch.rejected,
            dropped = stats.dispatch.dropped_deliveries,
            broker_connected = stats.broker.as_ref().map(|b| b.connected),
            "bus stats"
        );
    }

    /// Announce shutdown, then close the bus
    pub async fn shutdown(&self) -> Result<(), LifecycleError> {
        let details = json!({
            "uptime_secs": self.started_at.elapsed().as_secs(),
            "pid": std::process::id(),
        });
        if let Err(e) = self.service.system_shutdown(details, EventData::new()).await {
            warn!(error = %e, "could not publish shutdown event");
        }
        self.bus.shutdown().await?;
        info!("bus shut down");
        Ok(())
    }
}

/// Build the configured bus, falling back to in-process when the durable
/// backend cannot be reached.
pub async fn build_bus(config: &Config) -> (Arc<dyn EventBus>, Backend) {
    match pulse_bus::connect(config).await {
        Ok(bus) => (bus, config.bus.backend),
        Err(e) => {
            warn!(error = %e, url = %config.broker.url, "durable bus unavailable, falling back to in-process");
            let bus: Arc<dyn EventBus> =
                Arc::new(InProcessBus::new(&config.bus, config.source.clone()));
            (bus, Backend::InProcess)
        }
    }
}

/// Start the daemon: load config, build the bus, register handlers, and
/// announce startup.
pub async fn startup(daemon_config: &DaemonConfig) -> Result<Daemon, LifecycleError> {
    let config = Config::load(&daemon_config.config_path)?;
    info!(
        config = %daemon_config.config_path.display(),
        backend = ?config.bus.backend,
        source = %config.source,
        "configuration loaded"
    );
    startup_with(config, Arc::new(LogNotifyAdapter::new())).await
}

/// Start with an already-loaded config and a notification adapter
pub async fn startup_with(
    config: Config,
    notify: Arc<dyn NotifyAdapter>,
) -> Result<Daemon, LifecycleError> {
    let (bus, backend) = build_bus(&config).await;
    let handlers = register_default_handlers(bus.as_ref(), notify);
    let service = EventService::new(Arc::clone(&bus));

    let details = json!({
        "backend": format!("{:?}", backend),
        "pid": std::process::id(),
        "version": env!("CARGO_PKG_VERSION"),
    });
    service.system_startup(details, EventData::new()).await?;

    Ok(Daemon {
        config,
        bus,
        service,
        handlers,
        backend,
        started_at: Instant::now(),
    })
}

/// Directory holding `path`, for log setup
pub fn log_dir(path: &Path) -> Result<&Path, LifecycleError> {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Ok(Path::new(".")),
        Some(parent) => Ok(parent),
        None => Err(LifecycleError::NoLogDir(path.to_path_buf())),
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
