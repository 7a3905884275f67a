// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handler registration keyed by event type

use crate::error::HandlerError;
use async_trait::async_trait;
use pulse_core::Event;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// An asynchronous side effect run for every event of a registered type.
///
/// Handlers run detached from the publisher under a timeout, may see the same
/// event twice (broker echo) or not at all (dispatcher overflow), and are
/// never retried. Implementations must be idempotent.
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    /// Name used in logs
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    async fn handle(&self, event: &Event) -> Result<(), HandlerError>;
}

/// Handler backed by an async closure
pub struct FnHandler<F> {
    name: String,
    f: F,
}

#[async_trait]
impl<F, Fut> EventHandler for FnHandler<F>
where
    F: Fn(Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        (self.f)(event.clone()).await
    }
}

/// Wrap an async closure as a shareable handler
pub fn handler_fn<F, Fut>(name: impl Into<String>, f: F) -> Arc<dyn EventHandler>
where
    F: Fn(Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    Arc::new(FnHandler {
        name: name.into(),
        f,
    })
}

/// Maps event types to the handlers registered for them
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Vec<Arc<dyn EventHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler. Registering the same handler twice runs it twice.
    pub fn register(&mut self, event_type: &str, handler: Arc<dyn EventHandler>) {
        self.handlers
            .entry(event_type.to_string())
            .or_default()
            .push(handler);
    }

    /// Remove one registration of `handler` by pointer identity.
    ///
    /// Returns false when it was not registered for `event_type`.
    pub fn unregister(&mut self, event_type: &str, handler: &Arc<dyn EventHandler>) -> bool {
        let Some(list) = self.handlers.get_mut(event_type) else {
            return false;
        };
        let Some(index) = list
            .iter()
            .position(|h| std::ptr::addr_eq(Arc::as_ptr(h), Arc::as_ptr(handler)))
        else {
            return false;
        };
        list.remove(index);
        if list.is_empty() {
            self.handlers.remove(event_type);
        }
        true
    }

    /// Snapshot of the handlers for one type
    pub fn handlers_for(&self, event_type: &str) -> Vec<Arc<dyn EventHandler>> {
        self.handlers.get(event_type).cloned().unwrap_or_default()
    }

    /// Handler count per event type
    pub fn counts(&self) -> HashMap<String, usize> {
        self.handlers
            .iter()
            .map(|(event_type, list)| (event_type.clone(), list.len()))
            .collect()
    }

    pub fn total(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
