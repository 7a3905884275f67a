// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pulse replay` - read events back from the persistent stream

use crate::output::{print_stored, OutputFormat};
use anyhow::Result;
use clap::Args;
use pulse_adapters::EventStream;
use pulse_core::{Config, SubjectPattern, SUBJECT_WILDCARD};

#[derive(Args)]
pub struct ReplayArgs {
    /// Subject filter, e.g. events.users.>
    #[arg(long, default_value = SUBJECT_WILDCARD)]
    pub filter: String,

    /// First sequence number to read
    #[arg(long, default_value = "0")]
    pub from: u64,

    /// Maximum number of events
    #[arg(long, default_value = "100")]
    pub limit: usize,
}

pub async fn handle(args: ReplayArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let stream = pulse_bus::open_stream(config).await?;
    let messages = stream
        .read(&SubjectPattern::new(&args.filter), args.from, args.limit)
        .await?;
    tracing::debug!(filter = %args.filter, from = args.from, count = messages.len(), "replayed");

    for message in &messages {
        print_stored(message, format);
    }
    if messages.is_empty() {
        if let OutputFormat::Text = format {
            eprintln!("No events");
        }
    }
    Ok(())
}
