//! Buffered output feeding a terminal
//!
//! Producers write bytes through cloneable [`WorkloadWriter`] handles, from
//! any thread. Nothing reaches the terminal until [`Workload::flush`], which
//! tokenizes everything buffered so far as one batch. A flush boundary is
//! therefore a tokenization boundary; an escape sequence written in several
//! pieces is only split if a flush lands between the pieces.
//!
//! Tokens carry text, so bytes that are not valid UTF-8 are replaced with
//! U+FFFD before tokenizing. A multi-byte character cut off by a flush is
//! held back instead and completed by the next one.

use std::borrow::Cow;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{trace, warn};

use crate::parser::tokenize;
use crate::terminal::Terminal;

type SharedBuffer = Arc<Mutex<Vec<u8>>>;

fn lock(buffer: &SharedBuffer) -> MutexGuard<'_, Vec<u8>> {
    // A panicking writer cannot leave the byte buffer half-updated
    buffer.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owner of the shared write buffer and the single flush point
#[derive(Debug, Default)]
pub struct Workload {
    buffer: SharedBuffer,
    /// Bytes of a UTF-8 character cut off by the previous flush
    carry: Vec<u8>,
}

/// Write handle into a [`Workload`]
#[derive(Debug, Clone)]
pub struct WorkloadWriter {
    buffer: SharedBuffer,
}

impl Workload {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new handle appending to this workload
    pub fn writer(&self) -> WorkloadWriter {
        WorkloadWriter {
            buffer: Arc::clone(&self.buffer),
        }
    }

    /// Append bytes directly
    pub fn write(&self, data: &[u8]) {
        lock(&self.buffer).extend_from_slice(data);
    }

    /// Number of bytes waiting for the next flush
    pub fn pending_len(&self) -> usize {
        lock(&self.buffer).len() + self.carry.len()
    }

    /// Tokenize everything buffered and apply it to `terminal`.
    /// Returns the number of tokens applied.
    pub fn flush(&mut self, terminal: &mut Terminal) -> usize {
        let mut bytes = std::mem::take(&mut self.carry);
        bytes.append(&mut lock(&self.buffer));

        let complete = complete_prefix_len(&bytes);
        self.carry = bytes.split_off(complete);

        let text = String::from_utf8_lossy(&bytes);
        if let Cow::Owned(_) = text {
            warn!(bytes = bytes.len(), "invalid UTF-8 replaced");
        }
        let tokens = tokenize(&text);
        trace!(
            bytes = bytes.len(),
            tokens = tokens.len(),
            held = self.carry.len(),
            "workload flush"
        );
        terminal.apply(&tokens);
        tokens.len()
    }
}

impl WorkloadWriter {
    pub fn write_str(&self, s: &str) {
        lock(&self.buffer).extend_from_slice(s.as_bytes());
    }
}

impl io::Write for WorkloadWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(&self.buffer).extend_from_slice(buf);
        Ok(buf.len())
    }

    /// Buffered bytes only reach a terminal through [`Workload::flush`]
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Length of `bytes` without a trailing, incomplete UTF-8 sequence
fn complete_prefix_len(bytes: &[u8]) -> usize {
    let len = bytes.len();
    for back in 1..=len.min(3) {
        let byte = bytes[len - back];
        if byte & 0xC0 == 0x80 {
            continue;
        }
        let needed = match byte {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        };
        return if needed > back { len - back } else { len };
    }
    len
}
