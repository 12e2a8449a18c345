//! Ledger backend over cloud object storage
//!
//! Ledgers are exported as gzip-compressed batches whose object keys are
//! derived from the ledger sequence (see [`crate::partition`]). The backend
//! reads them back:
//!
//! - [`LedgerBackend::get_ledger`] derives the key, streams and decompresses
//!   the batch, decodes it and picks out the requested ledger
//! - [`LedgerBackend::prepare_range`] checks that the range boundaries exist
//! - [`LedgerBackend::get_latest_ledger_sequence`] scans partition directory
//!   and file listings for the highest exported ledger
//!
//! Nothing is retried; every store call races the caller's
//! [`CancellationToken`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cloudledger::backend::{CloudStorageBackend, LedgerBackend, Range};
//! use cloudledger::partition::PartitionConfig;
//!
//! let backend = CloudStorageBackend::connect("gs://ledgers/pubnet", PartitionConfig::default())?;
//! let cancel = CancellationToken::new();
//!
//! let latest = backend.get_latest_ledger_sequence(&cancel).await?;
//! backend.prepare_range(Range::bounded(latest - 10, latest), &cancel).await?;
//! let meta = backend.get_ledger(latest, &cancel).await?;
//! ```

mod cache;
mod cloud;
mod error;
pub mod latest;

pub use cloud::CloudStorageBackend;
pub use error::{BackendError, Boundary, ErrorKind, Result};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_util::sync::CancellationToken;

use crate::codec::LedgerCloseMeta;

/// Source of closed ledgers
#[async_trait]
pub trait LedgerBackend: Send + Sync {
    /// Most recent ledger sequence available
    async fn get_latest_ledger_sequence(&self, cancel: &CancellationToken) -> Result<u32>;

    /// Close metadata of ledger `sequence`
    async fn get_ledger(
        &self,
        sequence: u32,
        cancel: &CancellationToken,
    ) -> Result<LedgerCloseMeta>;

    /// Make `range` ready for reading
    async fn prepare_range(&self, range: Range, cancel: &CancellationToken) -> Result<()>;

    /// Whether `range` is ready for reading
    async fn is_prepared(&self, range: Range, cancel: &CancellationToken) -> Result<bool>;

    /// Release backend resources
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Ledger range; unbounded ranges have no end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    from: u32,
    to: u32,
    bounded: bool,
}

impl Range {
    /// `[from, to]`
    pub fn bounded(from: u32, to: u32) -> Self {
        Self {
            from,
            to,
            bounded: true,
        }
    }

    /// `[from, ∞)`
    pub fn unbounded(from: u32) -> Self {
        Self {
            from,
            to: 0,
            bounded: false,
        }
    }

    /// `[sequence, sequence]`
    pub fn single(sequence: u32) -> Self {
        Self::bounded(sequence, sequence)
    }

    pub fn from(&self) -> u32 {
        self.from
    }

    /// End of the range, `None` when unbounded
    pub fn to(&self) -> Option<u32> {
        self.bounded.then_some(self.to)
    }

    pub fn is_bounded(&self) -> bool {
        self.bounded
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bounded {
            write!(f, "[{},{}]", self.from, self.to)
        } else {
            write!(f, "[{},latest)", self.from)
        }
    }
}
