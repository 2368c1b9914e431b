//! # GeoAssist WAL (Write-Ahead Log)
//!
//! Write-ahead log for GeoAssist spatial indexes: every insert, update and
//! delete is appended to a log file as it is applied, and an index can be
//! rebuilt after a restart by replaying that file.
//!
//! ## ⚠️ Internal Implementation Detail
//!
//! **This crate is an internal implementation detail of GeoAssist.**
//!
//! Users should depend on the main `geoassist` crate instead, which
//! re-exports the stable parts of this API.

// Write-Ahead Log (WAL) implementation for GeoAssist
// One manager instance owns one log file; replay reads one file back

use geoassist_core::{Error, IndexObject, Result, SpatialIndex};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

pub mod id;
pub mod reader;
pub mod record;
pub mod replay;
pub mod segment;
pub mod writer;

pub use id::{IdGenerator, MonotonicIdGenerator, SequentialIdGenerator, TransactionId};
pub use reader::LogReader;
pub use record::{Mutation, TransactionRecord};
pub use replay::{apply_record, replay_file, ReplayStats};
pub use segment::{SegmentInfo, SegmentManager};
pub use writer::LogWriter;

/// File name suffix of WAL segments
pub const DEFAULT_FILE_SUFFIX: &str = ".wal";

/// WAL configuration options
#[derive(Debug, Clone)]
pub struct WalConfig {
    /// Directory holding the log files
    pub log_dir: PathBuf,
    /// Suffix appended to the identifier to form a log file name
    pub file_suffix: String,
    /// Treat INSERT/DELETE records missing their fields as errors during replay
    pub strict_replay: bool,
}

impl Default for WalConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("wal"),
            file_suffix: DEFAULT_FILE_SUFFIX.to_string(),
            strict_replay: false,
        }
    }
}

impl WalConfig {
    /// Default configuration writing to `log_dir`
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self::default().with_log_dir(log_dir)
    }

    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = log_dir.into();
        self
    }

    pub fn with_file_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.file_suffix = suffix.into();
        self
    }

    pub fn with_strict_replay(mut self, strict: bool) -> Self {
        self.strict_replay = strict;
        self
    }
}

/// WAL manager: appends records to its own log file and replays log files
/// into a spatial index
///
/// The log file name is fixed when the manager is created, from a fresh
/// identifier, but the file is only created by the first append. A log
/// directory therefore collects one file per manager that wrote anything.
///
/// Appends are not synchronized: concurrent writers to the same file must
/// coordinate externally.
pub struct WalManager<T, O> {
    config: WalConfig,
    writer: LogWriter,
    ids: Arc<dyn IdGenerator>,
    _marker: PhantomData<fn(T, O)>,
}

impl<T, O> WalManager<T, O> {
    /// Create a manager issuing time-ordered identifiers
    pub fn new(config: WalConfig) -> Result<Self> {
        Self::with_id_generator(config, Arc::new(MonotonicIdGenerator::new()))
    }

    /// Create a manager using `ids` for both the log file name and records
    ///
    /// The generator must produce fixed-width identifiers that sort in issue
    /// order, or latest-file discovery will pick the wrong file. A manager
    /// never adopts a file that already exists; a generator that hands out
    /// an identifier already used as a file name is rejected with
    /// [`Error::InvalidOperation`].
    pub fn with_id_generator(config: WalConfig, ids: Arc<dyn IdGenerator>) -> Result<Self> {
        let file_name = format!(
            "{}{}",
            ids.next_id()?.as_str().to_lowercase(),
            config.file_suffix
        );
        let wal_file = config.log_dir.join(file_name);
        if wal_file.exists() {
            return Err(Error::InvalidOperation(format!(
                "WAL file already exists, refusing to append to it: {}",
                wal_file.display()
            )));
        }
        debug!(path = %wal_file.display(), "WAL manager bound to log file");

        Ok(Self {
            config,
            writer: LogWriter::new(wal_file),
            ids,
            _marker: PhantomData,
        })
    }

    /// The log file this manager appends to
    pub fn log_file(&self) -> &Path {
        self.writer.path()
    }

    pub fn log_dir(&self) -> &Path {
        &self.config.log_dir
    }

    pub fn config(&self) -> &WalConfig {
        &self.config
    }

    /// The generator records for this manager should be created with
    pub fn id_generator(&self) -> &Arc<dyn IdGenerator> {
        &self.ids
    }

    /// Get a segment manager for the log directory
    pub fn segment_manager(&self) -> SegmentManager {
        SegmentManager::new(self.config.log_dir.clone(), self.config.file_suffix.clone())
    }

    /// The most recent log file in the log directory, if any
    pub fn latest_log_file(&self) -> Result<Option<PathBuf>> {
        Ok(self.segment_manager().latest_segment()?.map(|s| s.path))
    }

    /// Resolve a file reference for replay
    ///
    /// The reference is tried as given first and then relative to the log
    /// directory.
    pub fn resolve_log_file(&self, reference: impl AsRef<Path>) -> Result<PathBuf> {
        let reference = reference.as_ref();
        if reference.exists() {
            return Ok(reference.to_path_buf());
        }

        let in_log_dir = self.config.log_dir.join(reference);
        if in_log_dir.exists() {
            return Ok(in_log_dir);
        }

        Err(Error::FileNotFound(reference.display().to_string()))
    }
}

impl<T, O> WalManager<T, O>
where
    T: Serialize,
    O: Serialize,
{
    /// Append a record to this manager's log file
    pub fn append_to_log(&self, record: &TransactionRecord<T, O>) -> Result<()> {
        let line = record.encode()?;
        self.writer.append_line(&line)?;
        debug!(record = %record, "logged transaction");
        Ok(())
    }

    /// Log an insert of `object`
    pub fn log_insert(&self, object: IndexObject<T, O>) -> Result<TransactionId> {
        self.log(TransactionRecord::for_insert(&*self.ids, object)?)
    }

    /// Log an update of `id` to `data`
    pub fn log_update(&self, id: T, data: O) -> Result<TransactionId> {
        self.log(TransactionRecord::for_update(&*self.ids, id, data)?)
    }

    /// Log a delete of `id`
    pub fn log_delete(&self, id: T) -> Result<TransactionId> {
        self.log(TransactionRecord::for_delete(&*self.ids, id)?)
    }

    fn log(&self, record: TransactionRecord<T, O>) -> Result<TransactionId> {
        self.append_to_log(&record)?;
        Ok(record.transaction_id().clone())
    }
}

impl<T, O> WalManager<T, O>
where
    T: DeserializeOwned,
    O: DeserializeOwned,
{
    /// Replay the most recent log file in the log directory into `index`
    ///
    /// Only that one file is replayed. Callers that need older history can
    /// walk [`SegmentManager::list_segments`] and replay each file in order.
    pub fn replay_logs<I>(&self, index: &mut I) -> Result<ReplayStats>
    where
        I: SpatialIndex<T, O> + ?Sized,
    {
        let latest = self
            .latest_log_file()?
            .ok_or_else(|| Error::NoLogsToReplay(self.config.log_dir.clone()))?;

        self.replay_logs_from(index, latest)
    }

    /// Replay a specific log file into `index`
    ///
    /// See [`resolve_log_file`](Self::resolve_log_file) for how `reference`
    /// is located.
    pub fn replay_logs_from<I>(
        &self,
        index: &mut I,
        reference: impl AsRef<Path>,
    ) -> Result<ReplayStats>
    where
        I: SpatialIndex<T, O> + ?Sized,
    {
        let path = self.resolve_log_file(reference)?;
        replay_file(index, &path, self.config.strict_replay)
    }
}
