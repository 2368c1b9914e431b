//! # GeoAssist
//!
//! Crash recovery for mutable spatial indexes.
//!
//! Every insert, update and delete made to an index is appended to a
//! write-ahead log as one JSON line. After a restart the index is rebuilt
//! by replaying those lines in order.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use geoassist::{IndexObject, SpatialIndex, WalConfig, WalManager};
//!
//! # fn rebuild<I: SpatialIndex<u64, String>>(mut tree: I) -> geoassist::Result<()> {
//! let wal: WalManager<u64, String> = WalManager::new(WalConfig::new("./wal"))?;
//!
//! // Record mutations as they are made
//! wal.log_insert(
//!     IndexObject::builder()
//!         .id(42)
//!         .data("Badshahi Mosque".to_string())
//!         .latitude(31.5879)
//!         .longitude(74.3099)
//!         .build()?,
//! )?;
//! wal.log_update(42, "Badshahi Masjid".to_string())?;
//!
//! // After a restart: replay the most recent log into a fresh index
//! let stats = wal.replay_logs(&mut tree)?;
//! println!("replayed {} records from {}", stats.records_applied, stats.path.display());
//! # Ok(())
//! # }
//! ```
//!
//! [`DurableIndex`] combines the two steps: it recovers an index from every
//! log file in a directory and then logs each mutation before applying it.
//!
//! ## Log format
//!
//! ```text
//! {"transactionId":"0190f5...","operation":"INSERT","kdTreeObject":{"id":42,"data":"...","point":{"latitude":31.5879,"longitude":74.3099}}}
//! {"transactionId":"0190f5...","operation":"UPDATE","id":42,"data":"..."}
//! {"transactionId":"0190f5...","operation":"DELETE","id":42}
//! ```

pub mod durable;
pub mod logging;

// Re-export core types
pub use geoassist_core::{
    Error, IndexObject, IndexObjectBuilder, Operation, Point, PointBuilder, Result, SpatialIndex,
};

// WAL components
pub use geoassist_wal::{
    IdGenerator, LogReader, LogWriter, MonotonicIdGenerator, Mutation, ReplayStats,
    SegmentInfo, SegmentManager, SequentialIdGenerator, TransactionId, TransactionRecord,
    WalConfig, WalManager, DEFAULT_FILE_SUFFIX,
};

pub use durable::DurableIndex;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
