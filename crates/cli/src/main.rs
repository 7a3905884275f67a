// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! pulse - event bus CLI

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{publish, replay, tail};
use output::OutputFormat;
use pulse_core::Config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pulse",
    version,
    about = "Pulse - publish, replay and tail bus events"
)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = "pulse.toml")]
    config: PathBuf,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish one event
    Publish(publish::PublishArgs),
    /// Read events back from the persistent stream
    Replay(replay::ReplayArgs),
    /// Print events published on a topic
    Tail(tail::TailArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging();

    let config = Config::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    match cli.command {
        Commands::Publish(args) => publish::handle(args, &config, cli.format).await,
        Commands::Replay(args) => replay::handle(args, &config, cli.format).await,
        Commands::Tail(args) => tail::handle(args, &config, cli.format).await,
    }
}

/// Diagnostics go to stderr; stdout carries only command output
fn setup_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
