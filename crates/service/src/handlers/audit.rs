// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::SEEN_WINDOW;
use async_trait::async_trait;
use pulse_bus::{DedupWindow, EventHandler, HandlerError};
use pulse_core::{key, Event};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Most recent records kept in memory
const RECENT_LIMIT: usize = 1000;

/// One audit trail entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRecord {
    pub event_id: String,
    pub event_type: String,
    pub actor: Option<i64>,
    pub subject_user: Option<i64>,
    pub action: Option<String>,
    pub timestamp: String,
}

struct AuditState {
    seen: DedupWindow,
    recent: VecDeque<AuditRecord>,
}

/// Audit trail for membership changes and administrative actions.
///
/// Records go to the `audit` log target and to a bounded in-memory list.
pub struct AuditHandler {
    state: Mutex<AuditState>,
}

impl AuditHandler {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(AuditState {
                seen: DedupWindow::new(SEEN_WINDOW),
                recent: VecDeque::new(),
            }),
        }
    }

    /// Role, organization and admin events are audited
    pub fn is_audited(event_type: &str) -> bool {
        matches!(
            event_type.split_once('.').map(|(domain, _)| domain),
            Some("role" | "organization" | "admin")
        )
    }

    /// Recorded entries, oldest first
    pub fn recent(&self) -> Vec<AuditRecord> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.recent.iter().cloned().collect()
    }
}

impl Default for AuditHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventHandler for AuditHandler {
    fn name(&self) -> &str {
        "audit"
    }

    async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        let record = AuditRecord {
            event_id: event.id.clone(),
            event_type: event.event_type.clone(),
            actor: event.user_id,
            subject_user: event.get_i64(key::USER_ID),
            action: event.get_str(key::ACTION).map(str::to_string),
            timestamp: event.timestamp.to_rfc3339(),
        };

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if !state.seen.insert(&event.id) {
            return Ok(());
        }

        tracing::info!(
            target: "audit",
            event_id = %record.event_id,
            event_type = %record.event_type,
            actor = ?record.actor,
            subject_user = ?record.subject_user,
            action = ?record.action,
            "audit"
        );

        if state.recent.len() == RECENT_LIMIT {
            state.recent.pop_front();
        }
        state.recent.push_back(record);
        Ok(())
    }
}
