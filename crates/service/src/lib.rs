// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pulse-service: typed publishing and the standard side-effect handlers
//!
//! Application code calls [`EventService`]; it never builds topics or
//! payload keys by hand. [`register_default_handlers`] wires the audit,
//! notification, auth-tracking, metrics and system-log handlers onto a bus.

pub mod handlers;
mod payload;
mod service;

pub use handlers::{
    register_default_handlers, AuditHandler, AuditRecord, AuthFailureTracker, DefaultHandlers,
    MetricsHandler, SystemHandler, UserLifecycleHandler,
};
pub use payload::Payload;
pub use service::EventService;
