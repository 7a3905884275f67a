// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use async_trait::async_trait;
use pulse_bus::{EventHandler, HandlerError};
use pulse_core::{event_type, key, Event};
use tracing::Level;

/// Logs system lifecycle events at the severity they imply
#[derive(Debug, Default)]
pub struct SystemHandler;

impl SystemHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn severity(kind: &str) -> Level {
        match kind {
            event_type::SYSTEM_ERROR => Level::ERROR,
            event_type::SYSTEM_WARNING => Level::WARN,
            _ => Level::INFO,
        }
    }
}

#[async_trait]
impl EventHandler for SystemHandler {
    fn name(&self) -> &str {
        "system"
    }

    async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        let details = event.get(key::DETAILS).map(|d| d.to_string());
        let details = details.as_deref();
        let error = event.get_str(key::ERROR);
        let severity = Self::severity(&event.event_type);

        if severity == Level::ERROR {
            tracing::error!(source = %event.source, event_id = %event.id, error, details, "system error reported");
        } else if severity == Level::WARN {
            tracing::warn!(source = %event.source, event_id = %event.id, details, "system warning reported");
        } else {
            tracing::info!(
                source = %event.source,
                event_id = %event.id,
                event_type = %event.event_type,
                details,
                "system lifecycle"
            );
        }
        Ok(())
    }
}
