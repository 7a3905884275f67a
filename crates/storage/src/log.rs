// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stream log writer with retention pruning

use super::entry::{now_micros, StreamEntry};
use super::reader::{StreamReadError, StreamReader};
use pulse_core::SubjectPattern;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur in stream log operations
#[derive(Debug, Error)]
pub enum StreamLogError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload is not valid UTF-8")]
    NonUtf8Payload,
    #[error("read error: {0}")]
    Read(#[from] StreamReadError),
}

/// Append-only log of broker messages with a retention window
pub struct StreamLog {
    path: PathBuf,
    file: File,
    next_sequence: u64,
    retention: Duration,
    messages: u64,
    first_sequence: Option<u64>,
}

impl StreamLog {
    /// Open or create a stream log
    ///
    /// If the file exists, scans it to find the next sequence number. A
    /// corrupt tail is reported but left in place; call [`StreamLog::repair`]
    /// first when recovering from a crash.
    pub fn open(path: &Path, retention: Duration) -> Result<Self, StreamLogError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut last_sequence = None;
        let mut first_sequence = None;
        let mut messages = 0;
        for entry_result in StreamReader::open(path).entries()? {
            match entry_result {
                Ok(entry) => {
                    first_sequence.get_or_insert(entry.sequence);
                    last_sequence = Some(entry.sequence);
                    messages += 1;
                }
                Err(StreamReadError::Io(e)) => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(error = %e, path = %path.display(), "stream log has a corrupt tail");
                    break;
                }
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            next_sequence: last_sequence.map_or(1, |s| s + 1),
            retention,
            messages,
            first_sequence,
        })
    }

    /// Truncate a stream file at its first corrupt entry.
    ///
    /// Returns the number of bytes removed, or 0 if the file was intact.
    pub fn repair(path: &Path) -> Result<u64, StreamLogError> {
        let old_size = match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut iter = StreamReader::open(path).entries()?;
        let mut had_corruption = false;
        for entry_result in iter.by_ref() {
            match entry_result {
                Ok(_) => {}
                Err(StreamReadError::Io(e)) => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(error = %e, "stream corruption detected during repair");
                    had_corruption = true;
                    break;
                }
            }
        }

        let valid = iter.last_valid_position();
        if !had_corruption || valid >= old_size {
            return Ok(0);
        }

        let file = OpenOptions::new().write(true).open(path)?;
        file.set_len(valid)?;
        file.sync_all()?;
        tracing::info!(position = valid, "stream log truncated at corruption point");
        Ok(old_size - valid)
    }

    /// Append a message, returning its sequence number.
    ///
    /// The entry is durably persisted (fsync'd) before this returns.
    pub fn append(&mut self, subject: &str, payload: &[u8]) -> Result<u64, StreamLogError> {
        self.append_at(subject, payload, now_micros())
    }

    /// Append with an explicit timestamp (for testing retention)
    pub fn append_at(
        &mut self,
        subject: &str,
        payload: &[u8],
        timestamp_micros: u64,
    ) -> Result<u64, StreamLogError> {
        let payload =
            String::from_utf8(payload.to_vec()).map_err(|_| StreamLogError::NonUtf8Payload)?;
        let sequence = self.next_sequence;

        let entry = StreamEntry::new_with_timestamp(sequence, timestamp_micros, subject, payload);
        let line = entry.to_line()?;

        self.file.write_all(line.as_bytes())?;
        self.file.write_all(b"\n")?;
        self.file.sync_all()?;

        self.next_sequence += 1;
        self.messages += 1;
        self.first_sequence.get_or_insert(sequence);
        Ok(sequence)
    }

    /// Read up to `limit` entries matching `filter` from `from_sequence` on
    pub fn read(
        &self,
        filter: &SubjectPattern,
        from_sequence: u64,
        limit: usize,
    ) -> Result<Vec<StreamEntry>, StreamLogError> {
        Ok(StreamReader::open(&self.path).read(filter, from_sequence, limit)?)
    }

    /// Drop entries older than the retention window
    pub fn prune(&mut self) -> Result<usize, StreamLogError> {
        let cutoff = now_micros().saturating_sub(self.retention.as_micros() as u64);
        self.prune_before(cutoff)
    }

    /// Drop entries appended before `cutoff_micros`.
    ///
    /// Rewrites the file through a temporary sibling and renames it into
    /// place. Sequence numbers are never reused. A corrupt entry aborts the
    /// prune and leaves the log untouched; run [`StreamLog::repair`] first.
    pub fn prune_before(&mut self, cutoff_micros: u64) -> Result<usize, StreamLogError> {
        let tmp_path = self.path.with_extension("prune");
        let result = self.write_unexpired(&tmp_path, cutoff_micros);
        let (removed, kept, first_kept) = match result {
            Ok(counts) => counts,
            Err(e) => {
                let _ = std::fs::remove_file(&tmp_path);
                return Err(e);
            }
        };

        if removed == 0 {
            std::fs::remove_file(&tmp_path)?;
            return Ok(0);
        }

        std::fs::rename(&tmp_path, &self.path)?;
        self.file = OpenOptions::new().append(true).open(&self.path)?;
        self.messages = kept;
        self.first_sequence = first_kept;
        tracing::debug!(removed, path = %self.path.display(), "pruned stream log");
        Ok(removed)
    }

    /// Copy entries at or after the cutoff into `tmp_path`.
    ///
    /// Returns (removed, kept, first kept sequence).
    fn write_unexpired(
        &self,
        tmp_path: &Path,
        cutoff_micros: u64,
    ) -> Result<(usize, u64, Option<u64>), StreamLogError> {
        let mut out = BufWriter::new(File::create(tmp_path)?);
        let mut removed = 0;
        let mut kept = 0;
        let mut first_kept = None;
        for entry_result in StreamReader::open(&self.path).entries()? {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, path = %self.path.display(), "corrupt entry, prune skipped");
                    return Err(e.into());
                }
            };
            if entry.timestamp_micros < cutoff_micros {
                removed += 1;
                continue;
            }
            first_kept.get_or_insert(entry.sequence);
            kept += 1;
            out.write_all(entry.to_line()?.as_bytes())?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
        out.get_ref().sync_all()?;
        Ok((removed, kept, first_kept))
    }

    /// Sequence number the next append will receive
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    /// Last assigned sequence number, if any entry was ever written
    pub fn last_sequence(&self) -> Option<u64> {
        (self.next_sequence > 1).then(|| self.next_sequence - 1)
    }

    /// Entries currently in the log
    pub fn message_count(&self) -> u64 {
        self.messages
    }

    /// Oldest sequence still in the log
    pub fn first_sequence(&self) -> Option<u64> {
        self.first_sequence
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
