use std::fmt;
use thiserror::Error;

use crate::codec::CodecError;
use crate::datastore::DataStoreError;
use crate::partition::PartitionError;

/// Coarse classification of a [`BackendError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    NotFound,
    CorruptData,
    Range,
    Cancelled,
    Unavailable,
}

/// Which end of a range failed to load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Start,
    End,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::Start => f.write_str("starting"),
            Boundary::End => f.write_str("ending"),
        }
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to get object key for ledger {sequence}: {source}")]
    Config {
        sequence: u32,
        #[source]
        source: PartitionError,
    },

    #[error("ledger {sequence} not found: no object at {key}")]
    NotFound { sequence: u32, key: String },

    #[error("corrupt batch {key}: {source}")]
    CorruptData {
        key: String,
        #[source]
        source: CodecError,
    },

    #[error("ledger {sequence} outside batch {key} (start {start}, {len} records)")]
    OutOfBatch {
        sequence: u32,
        key: String,
        start: u32,
        len: usize,
    },

    #[error("failed converting filename {file_name} in '{directory}' to a ledger sequence")]
    InvalidFileName { directory: String, file_name: String },

    #[error("failed finding latest partition directory among {scanned} entries")]
    NoPartitionDirectory { scanned: usize },

    #[error("no ledger files in '{directory}'")]
    EmptyPartition { directory: String },

    #[error("error getting {which} ledger {sequence}: {source}")]
    RangeBoundary {
        which: Boundary,
        sequence: u32,
        #[source]
        source: Box<BackendError>,
    },

    #[error("{operation} cancelled")]
    Cancelled { operation: String },

    #[error("failed reading {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{operation} failed: {source}")]
    Store {
        operation: String,
        #[source]
        source: DataStoreError,
    },
}

impl BackendError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BackendError::Config { .. } => ErrorKind::Config,
            BackendError::NotFound { .. }
            | BackendError::NoPartitionDirectory { .. }
            | BackendError::EmptyPartition { .. } => ErrorKind::NotFound,
            BackendError::CorruptData { .. } => ErrorKind::CorruptData,
            BackendError::OutOfBatch { .. } | BackendError::InvalidFileName { .. } => {
                ErrorKind::Range
            }
            BackendError::RangeBoundary { source, .. } => source.kind(),
            BackendError::Cancelled { .. } => ErrorKind::Cancelled,
            BackendError::Read { .. } | BackendError::Store { .. } => ErrorKind::Unavailable,
        }
    }
}

pub type Result<T> = std::result::Result<T, BackendError>;
