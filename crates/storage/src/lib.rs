// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Append-only, retention-bounded event stream on local disk
//!
//! ```text
//! publish → StreamEntry → StreamLog::append → disk (events.log)
//!                                               ↓
//!                                 StreamReader → replay by subject / sequence
//! ```
//!
//! - Every append is fsync'd before returning
//! - CRC32 checksums detect bit flips; reads stop at the first bad entry
//! - `prune` drops entries older than the retention window

mod entry;
mod log;
mod reader;

pub use entry::StreamEntry;
pub use log::{StreamLog, StreamLogError};
pub use reader::{StreamEntryIter, StreamReadError, StreamReader};
