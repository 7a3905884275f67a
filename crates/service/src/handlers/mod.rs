// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Standard side-effect handlers
//!
//! Each handler tolerates duplicate and missed invocations: anything with an
//! observable side effect remembers recent event ids and ignores repeats.

mod audit;
mod auth;
mod metrics;
mod system;
mod users;

pub use audit::{AuditHandler, AuditRecord};
pub use auth::AuthFailureTracker;
pub use metrics::MetricsHandler;
pub use system::SystemHandler;
pub use users::UserLifecycleHandler;

use pulse_adapters::NotifyAdapter;
use pulse_bus::{EventBus, EventHandler};
use pulse_core::event_type;
use std::sync::Arc;

/// Event ids remembered per handler for duplicate suppression
const SEEN_WINDOW: usize = 4096;

/// Handles to the registered default handlers, for inspection
#[derive(Clone)]
pub struct DefaultHandlers {
    pub audit: Arc<AuditHandler>,
    pub auth: Arc<AuthFailureTracker>,
    pub metrics: Arc<MetricsHandler>,
    pub system: Arc<SystemHandler>,
    pub users: Arc<UserLifecycleHandler>,
}

/// Register the standard handler set on `bus`
pub fn register_default_handlers(
    bus: &dyn EventBus,
    notify: Arc<dyn NotifyAdapter>,
) -> DefaultHandlers {
    let handlers = DefaultHandlers {
        audit: Arc::new(AuditHandler::new()),
        auth: Arc::new(AuthFailureTracker::new(Arc::clone(&notify))),
        metrics: Arc::new(MetricsHandler::new()),
        system: Arc::new(SystemHandler::new()),
        users: Arc::new(UserLifecycleHandler::new(notify)),
    };

    let users: Arc<dyn EventHandler> = handlers.users.clone();
    for t in [
        event_type::USER_CREATED,
        event_type::USER_DELETED,
        event_type::USER_PASSWORD_CHANGED,
    ] {
        bus.register_handler(t, Arc::clone(&users));
    }

    let auth: Arc<dyn EventHandler> = handlers.auth.clone();
    bus.register_handler(event_type::AUTH_FAILURE, Arc::clone(&auth));
    bus.register_handler(event_type::AUTH_SUCCESS, auth);

    let audit: Arc<dyn EventHandler> = handlers.audit.clone();
    for t in event_type::ALL
        .iter()
        .filter(|t| AuditHandler::is_audited(t))
    {
        bus.register_handler(t, Arc::clone(&audit));
    }

    let system: Arc<dyn EventHandler> = handlers.system.clone();
    for t in [
        event_type::SYSTEM_STARTUP,
        event_type::SYSTEM_SHUTDOWN,
        event_type::SYSTEM_ERROR,
        event_type::SYSTEM_WARNING,
    ] {
        bus.register_handler(t, Arc::clone(&system));
    }

    let metrics: Arc<dyn EventHandler> = handlers.metrics.clone();
    for t in event_type::ALL {
        bus.register_handler(t, Arc::clone(&metrics));
    }

    tracing::info!(total = bus.stats().total_handlers, "default handlers registered");
    handlers
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
