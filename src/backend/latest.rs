//! Latest-ledger discovery from store listings
//!
//! Two passes: pick the partition directory with the highest end ledger,
//! then the highest ledger among the files inside it.
//!
//! Directory listings may contain foreign prefixes, so directory names that do
//! not end in `<start>-<end>` are skipped. Files inside a partition are only
//! ever written by the exporter, so an unparsable file name fails the lookup.

use super::error::{BackendError, Result};
use crate::partition::{parse_span, parse_u32, parse_u64};

/// Directory with the largest `<end>`; the first one wins on ties
pub fn latest_directory<S: AsRef<str>>(directories: &[S]) -> Result<&str> {
    let mut latest: Option<(u64, &str)> = None;

    for directory in directories {
        let directory = directory.as_ref();
        let Some(end) = directory_end(directory) else {
            tracing::debug!(directory, "Skipping malformed partition directory");
            continue;
        };

        if latest.is_none_or(|(largest, _)| end > largest) {
            latest = Some((end, directory));
        }
    }

    latest
        .map(|(_, directory)| directory)
        .ok_or(BackendError::NoPartitionDirectory {
            scanned: directories.len(),
        })
}

/// `<end>` of a name whose last segment is `<start>-<end>`
///
/// The top partition's end can lie past `u32::MAX`, so it is read as `u64`.
fn directory_end(directory: &str) -> Option<u64> {
    let segment = directory.trim_end_matches('/').rsplit('/').next()?;

    let mut parts = segment.split('-');
    let (start, end) = (parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    parse_u32(start)?;
    parse_u64(end)
}

/// Highest ledger held by `files`, all of which must be batch file names
///
/// Only the last path segment of each name is parsed, so listings may carry
/// the directory or store root as a prefix. A `<start>-<end>` name
/// contributes its `<end>`.
pub fn latest_file_sequence<S: AsRef<str>>(
    files: &[S],
    directory: &str,
    suffix: &str,
) -> Result<u32> {
    let mut latest = None;
    for file in files {
        let file_name = file.as_ref();
        let body = file_name.strip_suffix(suffix).unwrap_or(file_name);
        let body = body.rsplit('/').next().unwrap_or(body);

        let (_, last) = parse_span(body).ok_or_else(|| BackendError::InvalidFileName {
            directory: directory.to_string(),
            file_name: file_name.to_string(),
        })?;

        latest = latest.max(Some(last));
    }

    latest.ok_or_else(|| BackendError::EmptyPartition {
        directory: directory.to_string(),
    })
}
