// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pulse-bus: topic-based publish/subscribe with two interchangeable backends
//!
//! - [`InProcessBus`]: bounded channels and spawned handlers, nothing leaves
//!   the process. Delivery is at-most-once; a full subscriber loses events.
//! - [`DurableBus`]: the same local fan-out, plus a broker publish and a
//!   persistent stream. Broker echoes are fanned out again, so delivery is
//!   at-least-once unless a dedup window is configured.
//!
//! Pick one at startup with [`connect`] and share it as `Arc<dyn EventBus>`.

mod bus;
mod dedup;
mod dispatch;
mod durable;
mod error;
mod factory;
mod memory;
mod registry;
mod router;
mod subscription;

pub use bus::{BusStats, EventBus};
pub use dedup::DedupWindow;
pub use dispatch::{DispatchStats, Dispatcher};
pub use durable::DurableBus;
pub use error::{BusError, HandlerError};
pub use factory::{connect, connect_durable, open_stream, ConfiguredDurableBus};
pub use memory::InProcessBus;
pub use registry::{handler_fn, EventHandler, FnHandler, HandlerRegistry};
pub use subscription::Subscription;
