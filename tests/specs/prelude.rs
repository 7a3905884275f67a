// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for the behavioral specs

#![allow(dead_code)]

use pulse_bus::{handler_fn, EventHandler, HandlerError, InProcessBus, Subscription};
use pulse_core::{BusConfig, Event};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-process bus with default settings
pub fn memory_bus() -> InProcessBus {
    InProcessBus::new(&BusConfig::default(), "specs")
}

/// Poll `done` for up to two seconds
pub async fn eventually(mut done: impl FnMut() -> bool) -> bool {
    for _ in 0..400 {
        if done() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    done()
}

/// Next event, or None if nothing arrives within 200ms
pub async fn next(sub: &mut Subscription) -> Option<Event> {
    tokio::time::timeout(Duration::from_millis(200), sub.recv())
        .await
        .ok()
        .flatten()
}

/// Handler that counts its invocations
pub fn counter(name: &str, hits: &Arc<AtomicUsize>) -> Arc<dyn EventHandler> {
    let hits = Arc::clone(hits);
    handler_fn(name, move |_event| {
        let hits = Arc::clone(&hits);
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    })
}

/// Handler that always fails
pub fn failing(name: &str) -> Arc<dyn EventHandler> {
    handler_fn(name, |_event| async { Err(HandlerError::new("boom")) })
}
