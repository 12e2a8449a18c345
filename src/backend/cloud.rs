use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::cache::BatchCache;
use super::error::{BackendError, Boundary, Result};
use super::latest::{latest_directory, latest_file_sequence};
use super::{LedgerBackend, Range};
use crate::codec::{self, BatchDecoder, CodecError, LedgerCloseMeta, LedgerCloseMetaBatch, FramedBatchDecoder};
use crate::config::Config;
use crate::datastore::{DataStore, DataStoreError, ObjectDataStore};
use crate::observability::Metrics;
use crate::partition::PartitionConfig;

/// Ledger backend reading exported batch files from an object store
pub struct CloudStorageBackend {
    store: Arc<dyn DataStore>,
    decoder: Arc<dyn BatchDecoder>,
    partition: PartitionConfig,
    cache: Option<BatchCache>,
    metrics: Arc<Metrics>,
}

impl CloudStorageBackend {
    pub fn new(store: Arc<dyn DataStore>, partition: PartitionConfig) -> Self {
        Self {
            store,
            decoder: Arc::new(FramedBatchDecoder),
            partition,
            cache: None,
            metrics: Arc::new(Metrics::new()),
        }
    }

    /// Resolve `storage_url` into a data store and build a backend over it
    pub fn connect(
        storage_url: &str,
        partition: PartitionConfig,
    ) -> std::result::Result<Self, DataStoreError> {
        let store = ObjectDataStore::from_url(storage_url, &Default::default())?;
        Ok(Self::new(Arc::new(store), partition))
    }

    pub fn from_config(config: &Config) -> std::result::Result<Self, DataStoreError> {
        let store = ObjectDataStore::from_url(&config.storage.url, &config.storage.options)?;
        Ok(Self::new(Arc::new(store), config.partition.clone())
            .with_cache_capacity(config.cache.max_batches))
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn BatchDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Keep up to `max_batches` decoded batches in memory; 0 disables caching
    pub fn with_cache_capacity(mut self, max_batches: usize) -> Self {
        self.cache = NonZeroUsize::new(max_batches).map(BatchCache::new);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn partition(&self) -> &PartitionConfig {
        &self.partition
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Object key of the batch holding `sequence`
    pub fn object_key(&self, sequence: u32) -> Result<String> {
        self.partition
            .object_key(sequence)
            .map_err(|source| BackendError::Config { sequence, source })
    }

    /// Whole decoded batch holding `sequence`
    pub async fn get_batch(
        &self,
        sequence: u32,
        cancel: &CancellationToken,
    ) -> Result<Arc<LedgerCloseMetaBatch>> {
        let key = self.object_key(sequence)?;
        self.load_batch(sequence, &key, cancel).await
    }

    async fn load_batch(
        &self,
        sequence: u32,
        key: &str,
        cancel: &CancellationToken,
    ) -> Result<Arc<LedgerCloseMetaBatch>> {
        if cancel.is_cancelled() {
            return Err(BackendError::Cancelled {
                operation: format!("fetching {}", key),
            });
        }

        let batch_start = self
            .partition
            .batch_start(sequence)
            .map_err(|source| BackendError::Config { sequence, source })?;

        if let Some(cache) = &self.cache {
            if let Some(batch) = cache.get(batch_start) {
                self.metrics.batch_cache_hit();
                debug!(key, batch_start, "Batch served from cache");
                return Ok(batch);
            }
            self.metrics.batch_cache_miss();
        }

        let batch = match self.fetch_batch(sequence, key, cancel).await {
            Ok(batch) => Arc::new(batch),
            Err(err) => {
                self.metrics.fetch_failed();
                return Err(err);
            }
        };
        self.metrics.batch_fetched();

        if let Some(cache) = &self.cache {
            cache.insert(batch_start, batch.clone());
            debug!(key, batch_start, cached = cache.len(), "Batch cached");
        }

        Ok(batch)
    }

    async fn fetch_batch(
        &self,
        sequence: u32,
        key: &str,
        cancel: &CancellationToken,
    ) -> Result<LedgerCloseMetaBatch> {
        let operation = format!("fetching {}", key);

        cancellable(cancel, &operation, async {
            let reader = self.store.get_file(key).await.map_err(|err| match err {
                DataStoreError::NotFound(_) => BackendError::NotFound {
                    sequence,
                    key: key.to_string(),
                },
                source => BackendError::Store {
                    operation: operation.clone(),
                    source,
                },
            })?;

            // The reader is consumed here and dropped on every exit path
            let decompressed = codec::gunzip(reader).await.map_err(|source| {
                if codec::is_corrupt_framing(&source) {
                    BackendError::CorruptData {
                        key: key.to_string(),
                        source: CodecError::Decompress(source),
                    }
                } else {
                    BackendError::Read {
                        key: key.to_string(),
                        source,
                    }
                }
            })?;

            let batch = self
                .decoder
                .decode(&decompressed)
                .map_err(|source| BackendError::CorruptData {
                    key: key.to_string(),
                    source,
                })?;

            debug!(
                key,
                start = batch.start_sequence,
                records = batch.len(),
                bytes = decompressed.len(),
                payload = batch.payload_bytes(),
                "Decoded batch"
            );
            Ok(batch)
        })
        .await
    }

    async fn list_directories(&self, cancel: &CancellationToken) -> Result<Vec<String>> {
        let operation = "listing directory names";
        cancellable(cancel, operation, async {
            self.store
                .list_directory_names()
                .await
                .map_err(|source| BackendError::Store {
                    operation: operation.to_string(),
                    source,
                })
        })
        .await
    }

    async fn list_files(&self, directory: &str, cancel: &CancellationToken) -> Result<Vec<String>> {
        let operation = format!("listing files in '{}'", directory);
        cancellable(cancel, &operation, async {
            self.store
                .list_file_names(directory)
                .await
                .map_err(|source| BackendError::Store {
                    operation: operation.clone(),
                    source,
                })
        })
        .await
    }
}

/// Run `fut` unless `cancel` fires first
async fn cancellable<T, F>(cancel: &CancellationToken, operation: &str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!(operation, "Cancelled");
            Err(BackendError::Cancelled {
                operation: operation.to_string(),
            })
        }
        result = fut => result,
    }
}

#[async_trait]
impl LedgerBackend for CloudStorageBackend {
    async fn get_latest_ledger_sequence(&self, cancel: &CancellationToken) -> Result<u32> {
        self.metrics.latest_lookup();

        // Without partition directories every file sits at the store root
        let directory = if self.partition.is_partitioned() {
            let directories = self.list_directories(cancel).await?;
            latest_directory(&directories)?.to_string()
        } else {
            String::new()
        };

        let files = self.list_files(&directory, cancel).await?;
        let sequence = latest_file_sequence(&files, &directory, &self.partition.file_suffix)?;

        info!(directory = %directory, sequence, "Found latest ledger");
        Ok(sequence)
    }

    async fn get_ledger(
        &self,
        sequence: u32,
        cancel: &CancellationToken,
    ) -> Result<LedgerCloseMeta> {
        let key = self.object_key(sequence)?;
        let batch = self.load_batch(sequence, &key, cancel).await?;

        match batch.get(sequence) {
            Some(ledger) => {
                self.metrics.ledger_served();
                Ok(ledger.clone())
            }
            None => {
                warn!(
                    sequence,
                    key = %key,
                    start = batch.start_sequence,
                    records = batch.len(),
                    "Batch does not cover requested ledger"
                );
                Err(BackendError::OutOfBatch {
                    sequence,
                    key,
                    start: batch.start_sequence,
                    len: batch.len(),
                })
            }
        }
    }

    async fn prepare_range(&self, range: Range, cancel: &CancellationToken) -> Result<()> {
        let from = range.from();
        self.get_ledger(from, cancel)
            .await
            .map_err(|err| BackendError::RangeBoundary {
                which: Boundary::Start,
                sequence: from,
                source: Box::new(err),
            })?;

        if let Some(to) = range.to() {
            self.get_ledger(to, cancel)
                .await
                .map_err(|err| BackendError::RangeBoundary {
                    which: Boundary::End,
                    sequence: to,
                    source: Box::new(err),
                })?;
        }

        debug!(%range, "Range prepared");
        Ok(())
    }

    /// Data already sits in the store; there is nothing to wait for.
    async fn is_prepared(&self, _range: Range, _cancel: &CancellationToken) -> Result<bool> {
        Ok(true)
    }
}
