// Transaction identifiers and the generators that hand them out
//
// Every identifier is a fixed-width, lowercase string. Fixed width matters:
// log files are named after an identifier and the newest file is found by
// comparing file names as strings, so string order must equal issue order.

use crate::segment::SegmentManager;
use geoassist_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

/// Opaque, lexicographically sortable identifier of a log record or file
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for TransactionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of strictly increasing transaction identifiers
///
/// Implementations must be safe to share between threads and must never
/// return an identifier that sorts at or below one they returned before.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> Result<TransactionId>;
}

/// Time-ordered identifiers that stay ordered across process restarts
///
/// Values are UUIDv7 (48-bit millisecond timestamp followed by random
/// bits) rendered as 32 lowercase hex digits. The last issued value is
/// remembered so that two calls within the same millisecond, or a clock
/// that steps backwards, still produce a strictly greater identifier.
#[derive(Debug, Default)]
pub struct MonotonicIdGenerator {
    last: Mutex<u128>,
}

impl MonotonicIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for MonotonicIdGenerator {
    fn next_id(&self) -> Result<TransactionId> {
        let mut last = self.last.lock().map_err(|_| Error::LockPoisoned)?;

        let candidate = Uuid::now_v7().as_u128();
        let next = if candidate > *last {
            candidate
        } else {
            last.checked_add(1).ok_or_else(|| {
                Error::InvalidOperation("transaction id space exhausted".to_string())
            })?
        };
        *last = next;

        Ok(TransactionId(format!("{:032x}", next)))
    }
}

/// Zero-padded decimal counter: `00000001`, `00000002`, ...
///
/// Deterministic, so useful wherever file names need to be predictable.
/// Fails instead of widening once the counter no longer fits in `width`
/// digits, since a wider name would sort before the narrower ones.
///
/// A counter built with [`new`](Self::new) starts over at 1. After a
/// restart use [`resume`](Self::resume) so new identifiers sort after the
/// ones already on disk.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
    width: usize,
}

impl SequentialIdGenerator {
    pub const DEFAULT_WIDTH: usize = 8;

    /// Counter starting at 1 with the default width
    pub fn new() -> Self {
        Self::starting_at(1, Self::DEFAULT_WIDTH)
    }

    pub fn starting_at(start: u64, width: usize) -> Self {
        Self {
            next: AtomicU64::new(start),
            width,
        }
    }

    /// Counter continuing after every identifier found under `segments`
    ///
    /// Both segment file names and the `transactionId` of every record are
    /// considered. Identifiers that are not decimal numbers are ignored, as
    /// are lines that are not JSON.
    pub fn resume(segments: &SegmentManager) -> Result<Self> {
        Self::resume_with_width(segments, Self::DEFAULT_WIDTH)
    }

    pub fn resume_with_width(segments: &SegmentManager, width: usize) -> Result<Self> {
        let mut highest = 0u64;

        for segment in segments.list_segments()? {
            let stem = segment
                .name
                .strip_suffix(segments.suffix())
                .unwrap_or(&segment.name);
            highest = highest.max(stem.parse().unwrap_or(0));

            let file = File::open(&segment.path).map_err(|e| Error::io(&segment.path, e))?;
            for line in BufReader::new(file).lines() {
                let line = line.map_err(|e| Error::io(&segment.path, e))?;
                if let Ok(IdField {
                    transaction_id: Some(id),
                }) = serde_json::from_str::<IdField>(&line)
                {
                    highest = highest.max(id.parse().unwrap_or(0));
                }
            }
        }

        let next = highest.checked_add(1).ok_or_else(|| {
            Error::InvalidOperation("sequential id space exhausted".to_string())
        })?;
        Ok(Self::starting_at(next, width))
    }
}

#[derive(Deserialize)]
struct IdField {
    #[serde(rename = "transactionId")]
    transaction_id: Option<String>,
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> Result<TransactionId> {
        let value = self.next.fetch_add(1, Ordering::SeqCst);
        let id = format!("{:0width$}", value, width = self.width);

        if id.len() > self.width {
            return Err(Error::InvalidOperation(format!(
                "sequential id {} does not fit in {} digits",
                value, self.width
            )));
        }

        Ok(TransactionId(id))
    }
}
