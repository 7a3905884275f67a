// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The bus contract shared by every backend

use crate::dispatch::DispatchStats;
use crate::error::BusError;
use crate::registry::EventHandler;
use crate::subscription::Subscription;
use async_trait::async_trait;
use pulse_adapters::BrokerInfo;
use pulse_core::EventData;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Point-in-time counts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BusStats {
    pub topics: usize,
    pub total_subscribers: usize,
    pub total_handlers: usize,
    pub topic_subscribers: HashMap<String, usize>,
    pub event_handlers: HashMap<String, usize>,
    pub dispatch: DispatchStats,
    /// Durable backend only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broker: Option<BrokerInfo>,
}

/// Topic-based publish/subscribe with per-type handlers.
///
/// Delivery to subscribers never blocks the publisher: each subscription
/// has a bounded buffer, and an event that finds it full is dropped for that
/// subscriber only. Handlers run detached under a timeout; their failures
/// are logged, never returned.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Build an event and route it.
    ///
    /// Errors only on transport or serialization failure. Returns once
    /// handlers are scheduled, not when they finish.
    async fn publish(
        &self,
        topic: &str,
        event_type: &str,
        data: EventData,
        user_id: Option<i64>,
    ) -> Result<(), BusError>;

    /// Open a new bounded channel for `topic`. Each subscription receives its own copy.
    fn subscribe(&self, topic: &str) -> Result<Subscription, BusError>;

    /// Close a subscription. Unknown subscriptions are ignored.
    fn unsubscribe(&self, topic: &str, subscription: &Subscription);

    fn register_handler(&self, event_type: &str, handler: Arc<dyn EventHandler>);

    /// Remove a handler by `Arc` identity. Unknown handlers are ignored.
    fn unregister_handler(&self, event_type: &str, handler: &Arc<dyn EventHandler>);

    /// Close all subscriptions and stop background tasks. Safe to call twice.
    /// Handlers already running may finish afterwards.
    async fn shutdown(&self) -> Result<(), BusError>;

    fn stats(&self) -> BusStats;
}
