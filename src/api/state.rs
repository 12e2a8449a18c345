use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::backend::CloudStorageBackend;
use crate::observability::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<CloudStorageBackend>,
    pub metrics: Arc<Metrics>,
    /// Cancelled on server shutdown; requests run under child tokens
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(backend: CloudStorageBackend, shutdown: CancellationToken) -> Self {
        let metrics = backend.metrics().clone();
        Self {
            backend: Arc::new(backend),
            metrics,
            shutdown,
        }
    }

    /// Token for a single request
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}
