// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stream reader for replaying entries
//!
//! Invalid entries (checksum mismatch or parse errors) mark the end of the
//! readable stream: a torn write can only ever be the last line.

use super::entry::StreamEntry;
use pulse_core::SubjectPattern;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when reading stream entries
#[derive(Debug, Error)]
pub enum StreamReadError {
    #[error("corrupted entry at line {line}: {reason}")]
    Corrupted { line: u64, reason: String },
    #[error("checksum mismatch at line {line}")]
    ChecksumMismatch { line: u64 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read-only view of a stream file
pub struct StreamReader {
    path: PathBuf,
}

impl StreamReader {
    /// Create a reader; a missing file reads as empty
    pub fn open(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Iterate over all entries
    pub fn entries(&self) -> Result<StreamEntryIter, StreamReadError> {
        StreamEntryIter::new(&self.path, 0)
    }

    /// Iterate over entries with sequence >= `sequence`
    pub fn entries_from(&self, sequence: u64) -> Result<StreamEntryIter, StreamReadError> {
        StreamEntryIter::new(&self.path, sequence)
    }

    /// Collect up to `limit` valid entries matching `filter`, starting at
    /// `from_sequence`. Stops quietly at the first corrupt entry.
    pub fn read(
        &self,
        filter: &SubjectPattern,
        from_sequence: u64,
        limit: usize,
    ) -> Result<Vec<StreamEntry>, StreamReadError> {
        let mut out = Vec::new();
        for entry_result in self.entries_from(from_sequence)? {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(StreamReadError::Io(e)) => return Err(StreamReadError::Io(e)),
                Err(e) => {
                    tracing::warn!(error = %e, path = %self.path.display(), "stopping stream read");
                    break;
                }
            };
            if filter.matches(&entry.subject) {
                out.push(entry);
                if out.len() >= limit {
                    break;
                }
            }
        }
        Ok(out)
    }

    /// Get the path to the stream file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Iterator over stream entries with position tracking
pub struct StreamEntryIter {
    reader: Option<BufReader<File>>,
    line_number: u64,
    skip_until_sequence: u64,
    /// Position after the last successfully read and validated entry
    last_valid_position: u64,
    current_position: u64,
}

impl StreamEntryIter {
    fn new(path: &Path, skip_until_sequence: u64) -> Result<Self, StreamReadError> {
        let reader = match File::open(path) {
            Ok(file) => Some(BufReader::new(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            reader,
            line_number: 0,
            skip_until_sequence,
            last_valid_position: 0,
            current_position: 0,
        })
    }

    /// Byte position after the last valid entry
    pub fn last_valid_position(&self) -> u64 {
        self.last_valid_position
    }
}

impl Iterator for StreamEntryIter {
    type Item = Result<StreamEntry, StreamReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;

        loop {
            self.current_position = reader.stream_position().unwrap_or(self.current_position);

            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(bytes_read) => {
                    self.line_number += 1;

                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        self.current_position += bytes_read as u64;
                        continue;
                    }

                    // A line without its newline is a torn write
                    if !line.ends_with('\n') {
                        return Some(Err(StreamReadError::Corrupted {
                            line: self.line_number,
                            reason: "truncated entry".to_string(),
                        }));
                    }

                    let entry = match StreamEntry::from_line(trimmed) {
                        Ok(e) => e,
                        Err(e) => {
                            return Some(Err(StreamReadError::Corrupted {
                                line: self.line_number,
                                reason: e.to_string(),
                            }));
                        }
                    };

                    if !entry.verify() {
                        return Some(Err(StreamReadError::ChecksumMismatch {
                            line: self.line_number,
                        }));
                    }

                    let position_after_entry =
                        reader.stream_position().unwrap_or(self.current_position);
                    self.last_valid_position = position_after_entry;
                    self.current_position = position_after_entry;

                    if entry.sequence < self.skip_until_sequence {
                        continue;
                    }

                    return Some(Ok(entry));
                }
                Err(e) => return Some(Err(StreamReadError::Io(e))),
            }
        }
    }
}

#[cfg(test)]
#[path = "reader_tests.rs"]
mod tests;
