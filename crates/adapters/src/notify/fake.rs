// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recording notification adapter
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{NotifyAdapter, NotifyError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// A notification captured by [`FakeNotifyAdapter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyCall {
    pub channel: String,
    pub message: String,
}

/// Records notifications instead of delivering them. Clones share the record.
#[derive(Clone, Default)]
pub struct FakeNotifyAdapter {
    calls: Arc<Mutex<Vec<NotifyCall>>>,
}

impl FakeNotifyAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<NotifyCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Messages sent on one channel, oldest first
    pub fn messages_on(&self, channel: &str) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|c| c.channel == channel)
            .map(|c| c.message.clone())
            .collect()
    }
}

#[async_trait]
impl NotifyAdapter for FakeNotifyAdapter {
    async fn send(&self, channel: &str, message: &str) -> Result<(), NotifyError> {
        let call = NotifyCall {
            channel: channel.to_string(),
            message: message.to_string(),
        };
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(call);
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
