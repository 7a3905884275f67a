// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pulse tail <topic>` - print events published on a topic

use crate::output::{print_event, OutputFormat};
use anyhow::{bail, Result};
use clap::Args;
use pulse_core::{topic, Config};

#[derive(Args)]
pub struct TailArgs {
    /// Topic to follow
    pub topic: String,

    /// Exit after this many events
    #[arg(short = 'n', long)]
    pub count: Option<usize>,
}

pub async fn handle(args: TailArgs, config: &Config, format: OutputFormat) -> Result<()> {
    if !topic::ALL.contains(&args.topic.as_str()) {
        bail!(
            "unknown topic: {} (expected one of {})",
            args.topic,
            topic::ALL.join(", ")
        );
    }

    let bus = pulse_bus::connect(config).await?;
    let mut subscription = bus.subscribe(&args.topic)?;
    let mut seen = 0;

    loop {
        tokio::select! {
            event = subscription.recv() => {
                let Some(event) = event else { break };
                print_event(&event, format);
                seen += 1;
                if args.count.is_some_and(|n| seen >= n) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    bus.unsubscribe(&args.topic, &subscription);
    bus.shutdown().await?;
    Ok(())
}
