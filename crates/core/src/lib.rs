// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pulse-core: shared vocabulary for the pulse event bus
//!
//! This crate provides:
//! - The `Event` value object and its JSON wire shape
//! - The fixed topic, event-type and data-key vocabulary
//! - Broker subject naming and wildcard matching
//! - Id and clock abstractions so buses stay testable
//! - TOML configuration shared by the daemon and CLI

pub mod clock;
pub mod config;
pub mod event;
pub mod id;
pub mod subject;
pub mod vocab;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{
    Backend, BrokerConfig, BusConfig, Config, ConfigError, StreamBackend, StreamConfig,
};
pub use event::{event_data, Event, EventData};
pub use id::{IdGen, SequentialIdGen, TimeIdGen, UuidIdGen};
pub use subject::{parse_subject, subject_for, SubjectPattern, SUBJECT_PREFIX, SUBJECT_WILDCARD};
pub use vocab::{event_type, key, topic, topic_for};
