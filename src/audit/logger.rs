//! Audit logger for the append-only audit trail
//!
//! Each entry is one JSON line. History queries read the file backwards
//! from its end, so showing the last few entries of a long trail does not
//! load the whole file.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use crate::error::{UndoError, UndoResult};

use super::entry::{AuditEntry, Operation};

/// Bytes read per step when scanning backwards
const TAIL_CHUNK: usize = 8 * 1024;

/// Writes and queries the JSONL audit trail
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    /// Append an entry as a single line
    pub fn log(&self, entry: &AuditEntry) -> UndoResult<()> {
        let mut line = serde_json::to_vec(entry)
            .map_err(|e| UndoError::Json(format!("Failed to serialize audit entry: {}", e)))?;
        line.push(b'\n');

        // One write call per entry keeps concurrent appenders from interleaving
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .and_then(|mut file| file.write_all(&line))
            .map_err(|e| {
                UndoError::Io(format!(
                    "Failed to append to audit log {}: {}",
                    self.log_path.display(),
                    e
                ))
            })
    }

    /// Append an entry, logging instead of failing
    ///
    /// The audit trail never blocks the operation it describes.
    pub fn record(&self, entry: &AuditEntry) {
        if let Err(e) = self.log(entry) {
            tracing::warn!(
                error = %e,
                operation = %entry.operation,
                entity_id = %entry.entity_id,
                "failed to write audit entry"
            );
        }
    }

    /// The last `count` entries, oldest first, optionally only those of one
    /// operation
    pub fn read_recent(
        &self,
        count: usize,
        operation: Option<Operation>,
    ) -> UndoResult<Vec<AuditEntry>> {
        let mut newest_first = Vec::new();
        if count == 0 || !self.log_path.exists() {
            return Ok(newest_first);
        }

        let mut file = File::open(&self.log_path).map_err(|e| self.io_error(e))?;
        let mut pos = file.seek(SeekFrom::End(0)).map_err(|e| self.io_error(e))?;
        let mut carry: Vec<u8> = Vec::new();
        let mut chunk = vec![0u8; TAIL_CHUNK];

        while pos > 0 && newest_first.len() < count {
            let len = pos.min(TAIL_CHUNK as u64) as usize;
            pos -= len as u64;
            file.seek(SeekFrom::Start(pos))
                .and_then(|_| file.read_exact(&mut chunk[..len]))
                .map_err(|e| self.io_error(e))?;

            let mut buf = chunk[..len].to_vec();
            buf.extend_from_slice(&carry);

            let mut lines: Vec<&[u8]> = buf.split(|&b| b == b'\n').collect();
            // Unless the start of the file was reached, the first piece is
            // the tail of a line that began in an earlier chunk
            let head = if pos > 0 { lines.remove(0).to_vec() } else { Vec::new() };

            for line in lines.into_iter().rev() {
                if newest_first.len() == count {
                    break;
                }
                if let Some(entry) = parse_line(line)? {
                    if operation.map_or(true, |op| entry.operation == op) {
                        newest_first.push(entry);
                    }
                }
            }
            carry = head;
        }

        newest_first.reverse();
        Ok(newest_first)
    }

    fn io_error(&self, e: std::io::Error) -> UndoError {
        UndoError::Io(format!(
            "Failed to read audit log {}: {}",
            self.log_path.display(),
            e
        ))
    }
}

fn parse_line(line: &[u8]) -> UndoResult<Option<AuditEntry>> {
    if line.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(line)
        .map(Some)
        .map_err(|e| UndoError::Json(format!("Failed to parse audit entry: {}", e)))
}
