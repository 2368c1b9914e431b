//! Error types for GeoAssist.

use crate::operation::Operation;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for GeoAssist operations.
#[derive(Debug, Error)]
pub enum Error {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    /// Opening, reading or writing a file failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: std::io::Error,
    },

    /// The log directory (or one of its ancestors) could not be created
    #[error("Could not create directory structure: {}", .path.display())]
    CreateDirectory {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Not-found Errors
    // -------------------------------------------------------------------------
    /// An explicitly referenced log file does not exist
    #[error("WAL file does not exist at the specified location: {0}")]
    FileNotFound(String),

    /// Latest-file discovery found nothing to replay
    #[error("No log files to replay in directory: {}", .0.display())]
    NoLogsToReplay(PathBuf),

    // -------------------------------------------------------------------------
    // Data Errors
    // -------------------------------------------------------------------------
    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A record is missing a field its operation requires
    #[error("Incomplete information for {operation} in record: {record}")]
    IncompleteRecord {
        /// Operation named by the record
        operation: Operation,
        /// Short description of the offending record
        record: String,
    },

    /// A record names an operation outside INSERT/UPDATE/DELETE
    #[error("Unknown operation in transaction record: {0}")]
    UnknownOperation(String),

    // -------------------------------------------------------------------------
    // Collaborator Errors
    // -------------------------------------------------------------------------
    /// The target index rejected a mutation
    #[error("Index error: {0}")]
    Index(String),

    /// A lock was poisoned (internal error)
    #[error("Lock poisoned")]
    LockPoisoned,

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl Error {
    /// Wrap an I/O error together with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// A specialized `Result` type for GeoAssist operations.
pub type Result<T> = std::result::Result<T, Error>;
