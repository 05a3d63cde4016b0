//! Per-attempt transfer state and the progress snapshots derived from it.

use std::fmt;

use crate::format::{format_bytes, percent};

/// Progress after a chunk. Derived from `TransferState`, never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub received_bytes: u64,
    pub total_bytes: Option<u64>,
    /// Only present when the total is known.
    pub percent: Option<f64>,
}

impl ProgressSnapshot {
    pub fn new(received_bytes: u64, total_bytes: Option<u64>) -> Self {
        Self {
            received_bytes,
            total_bytes,
            percent: percent(received_bytes, total_bytes),
        }
    }

    pub fn rounded_percent(&self) -> Option<u64> {
        self.percent.map(|p| p.round() as u64)
    }
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.total_bytes, self.rounded_percent()) {
            (Some(total), Some(pct)) => write!(
                f,
                "{} of {} downloaded ({}%)",
                format_bytes(self.received_bytes),
                format_bytes(total),
                pct
            ),
            _ => write!(f, "{} downloaded", format_bytes(self.received_bytes)),
        }
    }
}

/// Mutable state of the current attempt. Reset by `begin_attempt`.
#[derive(Debug, Default)]
pub struct TransferState {
    received_bytes: u64,
    chunks: Vec<Vec<u8>>,
    attempt: u32,
}

impl TransferState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the next attempt from byte 0.
    pub fn begin_attempt(&mut self) -> u32 {
        self.attempt += 1;
        self.received_bytes = 0;
        self.chunks.clear();
        self.attempt
    }

    pub fn push(&mut self, chunk: Vec<u8>) {
        self.received_bytes += chunk.len() as u64;
        self.chunks.push(chunk);
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn received_bytes(&self) -> u64 {
        self.received_bytes
    }

    pub fn snapshot(&self, total_bytes: Option<u64>) -> ProgressSnapshot {
        ProgressSnapshot::new(self.received_bytes, total_bytes)
    }

    /// Concatenate the chunks in receipt order, leaving the state empty.
    pub fn take_payload(&mut self) -> Vec<u8> {
        let payload = self.chunks.concat();
        self.chunks.clear();
        payload
    }
}
