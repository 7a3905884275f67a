// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use clap::ValueEnum;
use pulse_adapters::StoredMessage;
use pulse_core::Event;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    /// One JSON document per line
    Json,
}

/// Print a live event
pub fn print_event(event: &Event, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", event_line(event)),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string(event) {
                println!("{}", json);
            }
        }
    }
}

/// Print a stored stream message.
///
/// JSON output is the payload exactly as it was stored.
pub fn print_stored(message: &StoredMessage, format: OutputFormat) {
    match format {
        OutputFormat::Text => match Event::from_json(&message.payload) {
            Ok(event) => println!("{:>6}  {}", message.sequence, event_line(&event)),
            Err(_) => println!(
                "{:>6}  {}  {}",
                message.sequence,
                message.subject,
                String::from_utf8_lossy(&message.payload)
            ),
        },
        OutputFormat::Json => println!("{}", String::from_utf8_lossy(&message.payload)),
    }
}

fn event_line(event: &Event) -> String {
    let user = event
        .user_id
        .map(|id| format!("user={} ", id))
        .unwrap_or_default();
    let data = serde_json::Value::Object(event.data.clone());
    format!(
        "{}  {:<28} {}{}",
        event.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
        event.event_type,
        user,
        data
    )
}
