// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Behavioral specifications for the pulse event bus.
//!
//! These tests drive the public crate APIs end to end: a bus, its
//! subscribers and handlers, the persistent stream and the service facade.
//! Broker traffic goes through the in-memory fake; no server is needed.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// bus/
#[path = "specs/bus/durable.rs"]
mod bus_durable;
#[path = "specs/bus/in_process.rs"]
mod bus_in_process;

// service/
#[path = "specs/service/defaults.rs"]
mod service_defaults;
