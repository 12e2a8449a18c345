//! Read-only object store access for ledger batch files
//! Uses Apache Arrow object_store crate

use async_trait::async_trait;
use futures::TryStreamExt;
use object_store::{ObjectStore, path::Path as StoragePath};
use std::collections::BTreeMap;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;
use url::Url;

#[derive(Debug, Error)]
pub enum DataStoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid storage URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Object store error: {0}")]
    ObjectStoreError(#[from] object_store::Error),
}

/// Data store result type
pub type Result<T> = std::result::Result<T, DataStoreError>;

/// Byte stream of one object; dropping it releases the underlying request
pub type ObjectReader = Pin<Box<dyn AsyncRead + Send>>;

/// The narrow slice of an object store the ledger backend needs
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Names of the top-level directories under the store root
    async fn list_directory_names(&self) -> Result<Vec<String>>;

    /// Names of the files directly inside `directory` (store root when empty)
    async fn list_file_names(&self, directory: &str) -> Result<Vec<String>>;

    /// Open `key` (relative to the store root) for reading
    async fn get_file(&self, key: &str) -> Result<ObjectReader>;
}

/// [`DataStore`] over any object_store backend
#[derive(Clone)]
pub struct ObjectDataStore {
    store: Arc<dyn ObjectStore>,
    root: StoragePath,
}

impl ObjectDataStore {
    /// Wrap an object_store backend, rooting all keys at `root`
    pub fn new(store: Arc<dyn ObjectStore>, root: impl Into<StoragePath>) -> Self {
        Self {
            store,
            root: root.into(),
        }
    }

    /// Create in-memory storage for testing/development
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(object_store::memory::InMemory::new()),
            StoragePath::default(),
        )
    }

    /// Resolve a storage URL (`s3://bucket/prefix`, `gs://…`, `file:///…`,
    /// `memory:///`) into a store rooted at the URL path
    pub fn from_url(url: &str, options: &BTreeMap<String, String>) -> Result<Self> {
        let parsed = Url::parse(url).map_err(|err| DataStoreError::InvalidUrl {
            url: url.to_string(),
            reason: err.to_string(),
        })?;

        let (store, root) = object_store::parse_url_opts(&parsed, options.iter())?;
        tracing::info!(url, root = %root, "Resolved ledger data store");

        Ok(Self::new(Arc::from(store), root))
    }

    pub fn root(&self) -> &StoragePath {
        &self.root
    }

    /// Backing object store, e.g. for seeding fixtures
    pub fn object_store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    fn key_path(&self, key: &str) -> StoragePath {
        if self.root.as_ref().is_empty() {
            StoragePath::from(key)
        } else {
            StoragePath::from(format!("{}/{}", self.root, key))
        }
    }
}

fn as_prefix(path: &StoragePath) -> Option<&StoragePath> {
    (!path.as_ref().is_empty()).then_some(path)
}

#[async_trait]
impl DataStore for ObjectDataStore {
    async fn list_directory_names(&self) -> Result<Vec<String>> {
        let listing = self.store.list_with_delimiter(as_prefix(&self.root)).await?;

        let directories: Vec<String> = listing
            .common_prefixes
            .into_iter()
            .map(|prefix| prefix.to_string())
            .collect();

        tracing::debug!(root = %self.root, count = directories.len(), "Listed directories");
        Ok(directories)
    }

    async fn list_file_names(&self, directory: &str) -> Result<Vec<String>> {
        let prefix = if directory.is_empty() {
            self.root.clone()
        } else {
            StoragePath::from(directory)
        };

        let listing = self.store.list_with_delimiter(as_prefix(&prefix)).await?;

        let files: Vec<String> = listing
            .objects
            .into_iter()
            .map(|meta| meta.location.to_string())
            .collect();

        tracing::debug!(directory, count = files.len(), "Listed files");
        Ok(files)
    }

    async fn get_file(&self, key: &str) -> Result<ObjectReader> {
        let path = self.key_path(key);

        let result = match self.store.get(&path).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => {
                return Err(DataStoreError::NotFound(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(key, size = result.meta.size, "Opened object");

        let stream = result.into_stream().map_err(std::io::Error::from);
        Ok(Box::pin(StreamReader::new(stream)))
    }
}
