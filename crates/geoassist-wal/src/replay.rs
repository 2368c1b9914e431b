// WAL replay - applies the records of one log file to a spatial index
//
// Replay is not transactional: records are applied one at a time in file
// order and the first error stops the replay, leaving every record before
// it applied.
//
// An UPDATE that lacks its id or data always aborts. An INSERT without its
// object or a DELETE without its id is skipped unless strict replay is on,
// in which case it aborts the same way.

use crate::reader::LogReader;
use crate::record::{Mutation, TransactionRecord};
use geoassist_core::{Error, Operation, Result, SpatialIndex};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of replaying one log file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// File that was replayed
    pub path: PathBuf,
    /// Records applied to the index
    pub records_applied: u64,
    /// Incomplete records skipped (non-strict replay only)
    pub records_skipped: u64,
    /// Applied INSERT records
    pub inserts: u64,
    /// Applied UPDATE records
    pub updates: u64,
    /// Applied DELETE records
    pub deletes: u64,
}

/// Apply a single record to the index
pub fn apply_record<T, O, I>(index: &mut I, record: TransactionRecord<T, O>) -> Result<()>
where
    I: SpatialIndex<T, O> + ?Sized,
{
    match record.into_mutation() {
        Mutation::Insert(object) => index.insert(object),
        Mutation::Update { id, data } => index.update(id, data),
        Mutation::Delete { id } => index.delete(id),
    }
}

/// Replay every record in `path` into `index`
pub fn replay_file<T, O, I>(index: &mut I, path: &Path, strict: bool) -> Result<ReplayStats>
where
    T: DeserializeOwned,
    O: DeserializeOwned,
    I: SpatialIndex<T, O> + ?Sized,
{
    info!(path = %path.display(), strict, "replaying WAL");

    let mut reader = LogReader::<T, O>::open(path)?;
    let mut stats = ReplayStats {
        path: path.to_path_buf(),
        ..Default::default()
    };

    loop {
        let record = match reader.next_record() {
            Ok(Some(record)) => record,
            Ok(None) => break,
            Err(Error::IncompleteRecord { operation, record })
                if !strict && operation != Operation::Update =>
            {
                warn!(
                    path = %path.display(),
                    line = reader.line_number(),
                    %operation,
                    record = %record,
                    "skipping incomplete WAL record"
                );
                stats.records_skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        let operation = record.operation();
        apply_record(index, record)?;

        stats.records_applied += 1;
        match operation {
            Operation::Insert => stats.inserts += 1,
            Operation::Update => stats.updates += 1,
            Operation::Delete => stats.deletes += 1,
        }
    }

    info!(
        path = %path.display(),
        applied = stats.records_applied,
        skipped = stats.records_skipped,
        "WAL replay complete"
    );

    Ok(stats)
}
