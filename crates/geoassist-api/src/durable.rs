//! A spatial index whose mutations are logged before they are applied.

use geoassist_core::{IndexObject, Result, SpatialIndex};
use geoassist_wal::{
    apply_record, replay_file, ReplayStats, TransactionRecord, WalConfig, WalManager,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

/// Wraps a [`SpatialIndex`] so every mutation goes through the WAL first.
///
/// A mutation is appended to the log and only then applied to the index,
/// so an index rebuilt from the log never misses a change the caller saw
/// succeed. If the index rejects a logged mutation the record stays in the
/// log and will be offered to the index again on the next recovery.
///
/// # Examples
///
/// ```rust,no_run
/// use geoassist::{DurableIndex, IndexObject, Result, SpatialIndex, WalConfig};
/// use std::collections::HashMap;
///
/// #[derive(Default)]
/// struct Places(HashMap<u64, IndexObject<u64, String>>);
///
/// impl SpatialIndex<u64, String> for Places {
///     fn insert(&mut self, object: IndexObject<u64, String>) -> Result<()> {
///         self.0.insert(*object.id(), object);
///         Ok(())
///     }
///     fn delete(&mut self, id: u64) -> Result<()> {
///         self.0.remove(&id);
///         Ok(())
///     }
///     fn update(&mut self, id: u64, data: String) -> Result<()> {
///         if let Some(object) = self.0.get_mut(&id) {
///             object.set_data(data);
///         }
///         Ok(())
///     }
/// }
///
/// let mut places = DurableIndex::open(Places::default(), WalConfig::new("./wal"))?;
/// places.insert(
///     IndexObject::builder()
///         .id(1)
///         .data("Lahore Fort".to_string())
///         .latitude(31.5880)
///         .longitude(74.3142)
///         .build()?,
/// )?;
/// # Ok::<(), geoassist::Error>(())
/// ```
pub struct DurableIndex<I, T, O> {
    index: I,
    wal: WalManager<T, O>,
    recovered: Vec<ReplayStats>,
}

impl<I, T, O> DurableIndex<I, T, O>
where
    I: SpatialIndex<T, O>,
    T: Serialize + DeserializeOwned,
    O: Serialize + DeserializeOwned,
{
    /// Rebuild `index` from every log file under the configured directory,
    /// oldest first, then start logging to a fresh file.
    ///
    /// An empty or missing log directory is a fresh start, not an error.
    pub fn open(index: I, config: WalConfig) -> Result<Self> {
        let wal = WalManager::new(config)?;
        Self::recover(index, wal)
    }

    /// Like [`open`](Self::open) but with a caller-built manager
    pub fn recover(mut index: I, wal: WalManager<T, O>) -> Result<Self> {
        let segments = wal.segment_manager().list_segments()?;
        let strict = wal.config().strict_replay;

        let mut recovered = Vec::with_capacity(segments.len());
        for segment in &segments {
            recovered.push(replay_file(&mut index, &segment.path, strict)?);
        }

        info!(
            dir = %wal.log_dir().display(),
            segments = segments.len(),
            records = recovered.iter().map(|s| s.records_applied).sum::<u64>(),
            "spatial index recovered"
        );

        Ok(Self {
            index,
            wal,
            recovered,
        })
    }
}

impl<I, T, O> DurableIndex<I, T, O> {
    /// Wrap an index without replaying anything
    pub fn new(index: I, wal: WalManager<T, O>) -> Self {
        Self {
            index,
            wal,
            recovered: Vec::new(),
        }
    }

    /// The wrapped index
    pub fn index(&self) -> &I {
        &self.index
    }

    /// The log mutations are written to
    pub fn wal(&self) -> &WalManager<T, O> {
        &self.wal
    }

    /// Per-file results of the replay performed when this index was opened
    pub fn recovery_stats(&self) -> &[ReplayStats] {
        &self.recovered
    }

    pub fn into_inner(self) -> I {
        self.index
    }
}

impl<I, T, O> DurableIndex<I, T, O>
where
    I: SpatialIndex<T, O>,
    T: Serialize,
    O: Serialize,
{
    fn log_and_apply(&mut self, record: Result<TransactionRecord<T, O>>) -> Result<()> {
        let record = record?;
        self.wal.append_to_log(&record)?;
        apply_record(&mut self.index, record)
    }
}

impl<I, T, O> SpatialIndex<T, O> for DurableIndex<I, T, O>
where
    I: SpatialIndex<T, O>,
    T: Serialize,
    O: Serialize,
{
    fn insert(&mut self, object: IndexObject<T, O>) -> Result<()> {
        let record = TransactionRecord::for_insert(&**self.wal.id_generator(), object);
        self.log_and_apply(record)
    }

    fn delete(&mut self, id: T) -> Result<()> {
        let record = TransactionRecord::for_delete(&**self.wal.id_generator(), id);
        self.log_and_apply(record)
    }

    fn update(&mut self, id: T, data: O) -> Result<()> {
        let record = TransactionRecord::for_update(&**self.wal.id_generator(), id, data);
        self.log_and_apply(record)
    }
}
