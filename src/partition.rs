//! Object key layout for ledger batch files
//!
//! Batches are grouped into partition directories, each spanning
//! `ledgers_per_file * files_per_partition` consecutive ledgers:
//!
//! ```text
//! {partition_start}-{partition_end}/{file_start}[-{file_end}]{suffix}
//! ```
//!
//! The directory segment is only emitted when a partition holds more than one
//! file, and `-{file_end}` only when a file holds more than one ledger.
//!
//! ```text
//! ledgers_per_file = 1,  files_per_partition = 64000
//!   5      -> 0-63999/5.xdr.gz
//!   64005  -> 64000-127999/64005.xdr.gz
//!
//! ledgers_per_file = 10, files_per_partition = 1
//!   25     -> 20-29.xdr.gz
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::Write;
use thiserror::Error;

pub const DEFAULT_FILE_SUFFIX: &str = ".xdr.gz";
pub const DEFAULT_LEDGERS_PER_FILE: u32 = 1;
pub const DEFAULT_FILES_PER_PARTITION: u32 = 64000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartitionError {
    #[error("invalid ledgers per file ({0}): must be at least 1")]
    InvalidLedgersPerFile(u32),
}

/// Deployment-wide file/directory granularity
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PartitionConfig {
    #[serde(default = "default_ledgers_per_file")]
    pub ledgers_per_file: u32,
    #[serde(default = "default_files_per_partition")]
    pub files_per_partition: u32,
    #[serde(default = "default_file_suffix")]
    pub file_suffix: String,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            ledgers_per_file: default_ledgers_per_file(),
            files_per_partition: default_files_per_partition(),
            file_suffix: default_file_suffix(),
        }
    }
}

fn default_ledgers_per_file() -> u32 {
    DEFAULT_LEDGERS_PER_FILE
}

fn default_files_per_partition() -> u32 {
    DEFAULT_FILES_PER_PARTITION
}

fn default_file_suffix() -> String {
    DEFAULT_FILE_SUFFIX.to_string()
}

impl PartitionConfig {
    pub fn new(ledgers_per_file: u32, files_per_partition: u32) -> Self {
        Self {
            ledgers_per_file,
            files_per_partition,
            file_suffix: default_file_suffix(),
        }
    }

    /// Object key of the batch file holding `sequence`
    pub fn object_key(&self, sequence: u32) -> Result<String, PartitionError> {
        format_key(
            sequence,
            self.ledgers_per_file,
            self.files_per_partition,
            &self.file_suffix,
        )
    }

    /// Number of ledgers covered by one partition directory
    pub fn partition_size(&self) -> u64 {
        u64::from(self.ledgers_per_file) * u64::from(self.files_per_partition)
    }

    /// Whether keys carry a partition directory segment
    pub fn is_partitioned(&self) -> bool {
        self.files_per_partition > 1
    }

    /// First ledger of the batch file holding `sequence`
    pub fn batch_start(&self, sequence: u32) -> Result<u32, PartitionError> {
        if self.ledgers_per_file < 1 {
            return Err(PartitionError::InvalidLedgersPerFile(self.ledgers_per_file));
        }
        Ok(sequence / self.ledgers_per_file * self.ledgers_per_file)
    }

    /// Ledger span `(first, last)` covered by a batch file name.
    ///
    /// Accepts a bare name or a full key; anything before the last `/` is
    /// ignored. Returns `None` when the name does not carry the configured
    /// suffix or its body is not `N` / `N-M`.
    pub fn file_span(&self, name: &str) -> Option<(u32, u32)> {
        let file = name.rsplit('/').next()?;
        let body = file.strip_suffix(self.file_suffix.as_str())?;
        parse_span(body)
    }
}

/// Object key for `sequence` using the default `.xdr.gz` suffix
pub fn object_key(
    sequence: u32,
    ledgers_per_file: u32,
    files_per_partition: u32,
) -> Result<String, PartitionError> {
    format_key(
        sequence,
        ledgers_per_file,
        files_per_partition,
        DEFAULT_FILE_SUFFIX,
    )
}

fn format_key(
    sequence: u32,
    ledgers_per_file: u32,
    files_per_partition: u32,
    suffix: &str,
) -> Result<String, PartitionError> {
    if ledgers_per_file < 1 {
        return Err(PartitionError::InvalidLedgersPerFile(ledgers_per_file));
    }

    // u64 so the last partition below u32::MAX cannot overflow
    let sequence = u64::from(sequence);
    let ledgers_per_file = u64::from(ledgers_per_file);
    let files_per_partition = u64::from(files_per_partition);

    let mut key = String::new();

    if files_per_partition > 1 {
        let partition_size = ledgers_per_file * files_per_partition;
        let partition_start = sequence / partition_size * partition_size;
        let partition_end = partition_start + partition_size - 1;
        let _ = write!(key, "{}-{}/", partition_start, partition_end);
    }

    let file_start = sequence / ledgers_per_file * ledgers_per_file;
    let file_end = file_start + ledgers_per_file - 1;
    let _ = write!(key, "{}", file_start);

    if file_start != file_end {
        let _ = write!(key, "-{}", file_end);
    }
    key.push_str(suffix);

    Ok(key)
}

/// Parse `N` or `N-M` (with `N <= M`) into an inclusive ledger span.
///
/// The last file below `u32::MAX` may name an end past it; the span is
/// clamped since no later ledger can exist.
pub(crate) fn parse_span(body: &str) -> Option<(u32, u32)> {
    match body.split_once('-') {
        Some((start, end)) => {
            let start = parse_u32(start)?;
            let end = parse_digits::<u64>(end)?;
            if u64::from(start) > end {
                return None;
            }
            Some((start, u32::try_from(end).unwrap_or(u32::MAX)))
        }
        None => parse_u32(body).map(|seq| (seq, seq)),
    }
}

/// Strict decimal parse: digits only, no sign
pub(crate) fn parse_u32(digits: &str) -> Option<u32> {
    parse_digits(digits)
}

/// Like [`parse_u32`], for partition bounds that may pass `u32::MAX`
pub(crate) fn parse_u64(digits: &str) -> Option<u64> {
    parse_digits(digits)
}

fn parse_digits<T: std::str::FromStr>(digits: &str) -> Option<T> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
