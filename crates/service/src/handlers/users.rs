// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::SEEN_WINDOW;
use async_trait::async_trait;
use pulse_adapters::NotifyAdapter;
use pulse_bus::{DedupWindow, EventHandler, HandlerError};
use pulse_core::{event_type, key, Event};
use std::sync::{Arc, Mutex};

pub const WELCOME_CHANNEL: &str = "welcome";
pub const GOODBYE_CHANNEL: &str = "goodbye";
pub const SECURITY_CHANNEL: &str = "security";

/// Sends welcome, goodbye and password-change notices
pub struct UserLifecycleHandler {
    notify: Arc<dyn NotifyAdapter>,
    seen: Mutex<DedupWindow>,
}

impl UserLifecycleHandler {
    pub fn new(notify: Arc<dyn NotifyAdapter>) -> Self {
        Self {
            notify,
            seen: Mutex::new(DedupWindow::new(SEEN_WINDOW)),
        }
    }

    fn message(event: &Event) -> Option<(&'static str, String)> {
        let who = event
            .get_str(key::EMAIL)
            .map(str::to_string)
            .or_else(|| event.get_i64(key::USER_ID).map(|id| format!("user {}", id)))?;
        match event.event_type.as_str() {
            event_type::USER_CREATED => {
                let name = event.get_str(key::NAME).unwrap_or(&who);
                Some((WELCOME_CHANNEL, format!("Welcome, {} <{}>", name, who)))
            }
            event_type::USER_DELETED => Some((GOODBYE_CHANNEL, format!("Goodbye, {}", who))),
            event_type::USER_PASSWORD_CHANGED => Some((
                SECURITY_CHANNEL,
                format!("Password changed for {}", who),
            )),
            _ => None,
        }
    }
}

#[async_trait]
impl EventHandler for UserLifecycleHandler {
    fn name(&self) -> &str {
        "user-lifecycle"
    }

    async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        let Some((channel, message)) = Self::message(event) else {
            return Ok(());
        };
        let fresh = self
            .seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(&event.id);
        if !fresh {
            tracing::debug!(event_id = %event.id, "duplicate user event ignored");
            return Ok(());
        }
        self.notify.send(channel, &message).await?;
        Ok(())
    }
}
