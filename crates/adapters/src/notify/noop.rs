// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{NotifyAdapter, NotifyError};
use async_trait::async_trait;

/// Discards every notification
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpNotifyAdapter;

impl NoOpNotifyAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotifyAdapter for NoOpNotifyAdapter {
    async fn send(&self, _channel: &str, _message: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}
