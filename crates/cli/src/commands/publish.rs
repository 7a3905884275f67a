// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pulse publish <type>` - publish one event through the configured bus

use crate::output::OutputFormat;
use anyhow::{anyhow, bail, Result};
use clap::Args;
use pulse_core::{event_data, topic_for, Config};

#[derive(Args)]
pub struct PublishArgs {
    /// Event type, e.g. user.created
    pub event_type: String,

    /// Event data as a JSON object
    #[arg(short, long, default_value = "{}")]
    pub data: String,

    /// Acting user
    #[arg(long)]
    pub user_id: Option<i64>,

    /// Topic, when the event type is not a known one
    #[arg(long)]
    pub topic: Option<String>,
}

pub async fn handle(args: PublishArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let topic = match args.topic.as_deref() {
        Some(topic) => topic.to_string(),
        None => topic_for(&args.event_type)
            .ok_or_else(|| {
                anyhow!(
                    "unknown event type: {} (pass --topic to publish it anyway)",
                    args.event_type
                )
            })?
            .to_string(),
    };

    let value: serde_json::Value = serde_json::from_str(&args.data)?;
    if !value.is_object() {
        bail!("--data must be a JSON object");
    }

    tracing::debug!(topic = %topic, event_type = %args.event_type, user_id = ?args.user_id, "publishing");
    let bus = pulse_bus::connect(config).await?;
    let result = bus
        .publish(&topic, &args.event_type, event_data(value), args.user_id)
        .await;
    bus.shutdown().await?;
    result?;

    match format {
        OutputFormat::Text => println!("Published {} to {}", args.event_type, topic),
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "topic": topic, "type": args.event_type })
        ),
    }
    Ok(())
}
