// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{NotifyAdapter, NotifyError};
use async_trait::async_trait;

/// Writes notifications to the log under the `notify` target
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifyAdapter;

impl LogNotifyAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotifyAdapter for LogNotifyAdapter {
    async fn send(&self, channel: &str, message: &str) -> Result<(), NotifyError> {
        tracing::info!(target: "notify", channel, message, "notification");
        Ok(())
    }
}
