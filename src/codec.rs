//! Batch payload model and decoding
//!
//! A batch object is a gzip stream wrapping one encoded batch. Records are kept
//! as opaque bytes; turning them into structured ledger data is the caller's
//! concern, and so is the record encoding.
//!
//! The bundled [`FramedBatchDecoder`] reads a length-framed layout built from
//! XDR primitives:
//!
//! ```text
//! uint32 startSequence
//! uint32 endSequence
//! uint32 count
//! count x opaque<>     (uint32 length, bytes, zero padding to 4)
//! ```
//!
//! This is not the Stellar `LedgerCloseMetaBatch` wire format, where each
//! record is an unframed `LedgerCloseMeta` union. Stores written by the Stellar
//! exporter need a [`BatchDecoder`] backed by a full XDR type library, plugged
//! in through `CloudStorageBackend::with_decoder`.

use async_compression::tokio::bufread::GzipDecoder;
use bytes::Bytes;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid gzip stream: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("batch truncated at byte {offset}: {needed} more bytes required")]
    Truncated { offset: usize, needed: usize },

    #[error("batch declares ledgers {start}..={end} but holds {count} records")]
    CountMismatch { start: u32, end: u32, count: u32 },

    #[error("non-zero padding after record at byte {0}")]
    Padding(usize),

    #[error("{0} trailing bytes after batch")]
    TrailingBytes(usize),
}

/// One ledger's close metadata, undecoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerCloseMeta(Bytes);

impl LedgerCloseMeta {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Consecutive ledgers stored as a single object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerCloseMetaBatch {
    pub start_sequence: u32,
    pub end_sequence: u32,
    pub ledger_close_metas: Vec<LedgerCloseMeta>,
}

impl LedgerCloseMetaBatch {
    /// Record for `sequence`, if the batch covers it
    pub fn get(&self, sequence: u32) -> Option<&LedgerCloseMeta> {
        let index = sequence.checked_sub(self.start_sequence)?;
        self.ledger_close_metas.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.ledger_close_metas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ledger_close_metas.is_empty()
    }

    /// Total record payload size
    pub fn payload_bytes(&self) -> usize {
        self.ledger_close_metas.iter().map(LedgerCloseMeta::len).sum()
    }
}

/// Turns a decompressed batch object into records
pub trait BatchDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<LedgerCloseMetaBatch, CodecError>;
}

/// Decoder for the length-framed batch layout described in the module docs
#[derive(Debug, Clone, Copy, Default)]
pub struct FramedBatchDecoder;

impl BatchDecoder for FramedBatchDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<LedgerCloseMetaBatch, CodecError> {
        let mut cursor = XdrCursor::new(bytes);

        let start = cursor.read_u32()?;
        let end = cursor.read_u32()?;
        let count = cursor.read_u32()?;

        if end < start || u64::from(end - start) + 1 != u64::from(count) {
            return Err(CodecError::CountMismatch { start, end, count });
        }

        // Each record needs at least its 4-byte length prefix
        let mut records = Vec::with_capacity((count as usize).min(cursor.remaining() / 4));
        for _ in 0..count {
            records.push(LedgerCloseMeta::new(cursor.read_opaque()?));
        }

        if cursor.remaining() > 0 {
            return Err(CodecError::TrailingBytes(cursor.remaining()));
        }

        Ok(LedgerCloseMetaBatch {
            start_sequence: start,
            end_sequence: end,
            ledger_close_metas: records,
        })
    }
}

struct XdrCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> XdrCursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < len {
            return Err(CodecError::Truncated {
                offset: self.pos,
                needed: len - self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn read_u32(&mut self) -> Result<u32, CodecError> {
        let raw = self.take(4)?;
        Ok(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    fn read_opaque(&mut self) -> Result<Bytes, CodecError> {
        let len = self.read_u32()? as usize;
        let data = Bytes::copy_from_slice(self.take(len)?);

        let pad = (4 - len % 4) % 4;
        let offset = self.pos;
        if self.take(pad)?.iter().any(|&b| b != 0) {
            return Err(CodecError::Padding(offset));
        }
        Ok(data)
    }
}

/// Read a gzip stream to the end.
///
/// Errors keep their `io::ErrorKind`: `InvalidData`/`UnexpectedEof` mean the
/// framing is bad, anything else came from the underlying reader.
pub async fn gunzip<R>(reader: R) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut decoder = GzipDecoder::new(BufReader::new(reader));
    decoder.multiple_members(true);

    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed).await?;
    Ok(decompressed)
}

/// Whether an I/O error from [`gunzip`] means corrupt framing
pub fn is_corrupt_framing(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::InvalidData | std::io::ErrorKind::UnexpectedEof
    )
}


#[cfg(test)]
mod tests {
    use super::fixtures::{encode_batch, gzip};
    use super::*;

    #[test]
    fn test_decode_batch() {
        let bytes = encode_batch(100, &[b"a", b"bbbb", b"ccccc"]);
        let batch = FramedBatchDecoder.decode(&bytes).unwrap();

        assert_eq!(batch.start_sequence, 100);
        assert_eq!(batch.end_sequence, 102);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.get(100).unwrap().as_bytes(), b"a");
        assert_eq!(batch.get(101).unwrap().as_bytes(), b"bbbb");
        assert_eq!(batch.get(102).unwrap().as_bytes(), b"ccccc");
        assert_eq!(batch.payload_bytes(), 10);
    }

    #[test]
    fn test_batch_get_outside_range() {
        let batch = FramedBatchDecoder
            .decode(&encode_batch(100, &[b"a", b"b"]))
            .unwrap();
        assert!(batch.get(99).is_none());
        assert!(batch.get(102).is_none());
        assert!(batch.get(0).is_none());
    }

    #[test]
    fn test_decode_empty_record() {
        let batch = FramedBatchDecoder.decode(&encode_batch(7, &[b""])).unwrap();
        assert!(batch.get(7).unwrap().is_empty());
    }

    #[test]
    fn test_decode_truncated() {
        let bytes = encode_batch(1, &[b"hello", b"world"]);
        let result = FramedBatchDecoder.decode(&bytes[..bytes.len() - 5]);
        assert!(matches!(result, Err(CodecError::Truncated { .. })));

        let result = FramedBatchDecoder.decode(&bytes[..6]);
        assert!(matches!(result, Err(CodecError::Truncated { offset: 4, needed: 2 })));
    }

    #[test]
    fn test_decode_count_mismatch() {
        let mut bytes = encode_batch(10, &[b"a", b"b"]);
        // endSequence = 12, still two records
        bytes[4..8].copy_from_slice(&12u32.to_be_bytes());
        assert!(matches!(
            FramedBatchDecoder.decode(&bytes),
            Err(CodecError::CountMismatch { start: 10, end: 12, count: 2 })
        ));

        let mut bytes = encode_batch(10, &[b"a"]);
        bytes[4..8].copy_from_slice(&9u32.to_be_bytes());
        assert!(matches!(
            FramedBatchDecoder.decode(&bytes),
            Err(CodecError::CountMismatch { .. })
        ));
    }

    #[test]
    fn test_decode_bad_padding() {
        let mut bytes = encode_batch(1, &[b"abc"]);
        let last = bytes.len() - 1;
        bytes[last] = 0xff;
        assert!(matches!(
            FramedBatchDecoder.decode(&bytes),
            Err(CodecError::Padding(_))
        ));
    }

    #[test]
    fn test_decode_trailing_bytes() {
        let mut bytes = encode_batch(1, &[b"abcd"]);
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        assert!(matches!(
            FramedBatchDecoder.decode(&bytes),
            Err(CodecError::TrailingBytes(4))
        ));
    }

    #[test]
    fn test_decode_huge_count_does_not_preallocate() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes.extend_from_slice(&(u32::MAX - 1).to_be_bytes());
        bytes.extend_from_slice(&u32::MAX.to_be_bytes());
        assert!(matches!(
            FramedBatchDecoder.decode(&bytes),
            Err(CodecError::Truncated { .. })
        ));
    }

    #[tokio::test]
    async fn test_gunzip_roundtrip() {
        let payload = encode_batch(5, &[b"ledger-five"]);
        let compressed = gzip(&payload);

        let decompressed = gunzip(std::io::Cursor::new(compressed)).await.unwrap();
        assert_eq!(decompressed, payload);
    }

    #[tokio::test]
    async fn test_gunzip_rejects_garbage() {
        let err = gunzip(std::io::Cursor::new(b"definitely not gzip".to_vec()))
            .await
            .unwrap_err();
        assert!(is_corrupt_framing(&err));
    }

    #[tokio::test]
    async fn test_gunzip_rejects_truncated_stream() {
        let compressed = gzip(&encode_batch(5, &[b"ledger-five"]));
        let err = gunzip(std::io::Cursor::new(compressed[..compressed.len() - 6].to_vec()))
            .await
            .unwrap_err();
        assert!(is_corrupt_framing(&err));
    }
}
