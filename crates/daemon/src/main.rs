// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pulse Daemon (pulsed)
//!
//! Long-running process that owns the event bus and its default handlers.

use std::time::Duration;

use pulse_daemon::lifecycle::{self, log_dir, DaemonConfig, LifecycleError};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let arg = std::env::args().nth(1);
    let config = DaemonConfig::from_arg(arg.as_deref());

    // Written before tracing so the marker is first even if setup fails
    write_startup_marker(&config)?;
    let log_guard = setup_logging(&config)?;

    info!(config = %config.config_path.display(), "starting pulsed");

    let daemon = match lifecycle::startup(&config).await {
        Ok(d) => d,
        Err(e) => {
            write_startup_error(&config, &e);
            error!(error = %e, "failed to start daemon");
            drop(log_guard);
            return Err(e.into());
        }
    };

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(backend = ?daemon.backend, "daemon ready");
    println!("READY");

    let mut stats_tick = tokio::time::interval(config.stats_interval.max(Duration::from_secs(1)));
    stats_tick.tick().await;

    loop {
        tokio::select! {
            _ = stats_tick.tick() => daemon.log_stats(),

            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down");
                break;
            }

            _ = sigint.recv() => {
                info!("received SIGINT, shutting down");
                break;
            }
        }
    }

    daemon.log_stats();
    daemon.shutdown().await?;
    info!("daemon stopped");
    Ok(())
}

/// Startup marker prefix written to the log before anything else.
/// Full format: "--- pulsed: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- pulsed: starting (pid: ";

fn write_startup_marker(config: &DaemonConfig) -> Result<(), LifecycleError> {
    use std::io::Write;

    std::fs::create_dir_all(log_dir(&config.log_path)?)?;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;
    Ok(())
}

/// Write a startup error synchronously; the tracing writer may not flush
/// before the process exits.
fn write_startup_error(config: &DaemonConfig, error: &LifecycleError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR failed to start daemon: {}", error);
}

fn setup_logging(
    config: &DaemonConfig,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let dir = log_dir(&config.log_path)?;
    let file_name = config
        .log_path
        .file_name()
        .ok_or_else(|| LifecycleError::NoLogDir(config.log_path.clone()))?;
    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
