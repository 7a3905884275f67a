// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: message broker, persistent stream, notifications

pub mod broker;
pub mod notify;
pub mod stream;
pub mod traced;

pub use broker::{Broker, BrokerError, BrokerInfo, BrokerMessage, MessageStream, NatsBroker};
pub use notify::{LogNotifyAdapter, NoOpNotifyAdapter, NotifyAdapter, NotifyError};
pub use stream::{
    AnyEventStream, EventStream, FileStreamLog, JetStreamLog, StoredMessage, StreamError,
    StreamInfo,
};
pub use traced::{TracedBroker, TracedEventStream};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use broker::FakeBroker;
#[cfg(any(test, feature = "test-support"))]
pub use notify::{FakeNotifyAdapter, NotifyCall};
#[cfg(any(test, feature = "test-support"))]
pub use stream::FakeEventStream;
