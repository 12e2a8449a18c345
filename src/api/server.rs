use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{
    services::{get_ledger, health, latest_ledger, ledger_key, metrics, prepare_range},
    state::AppState,
};
use crate::backend::{CloudStorageBackend, LedgerBackend};
use crate::config::Config;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All routes over `state`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/ledgers/latest", get(latest_ledger))
        .route("/ledgers/{sequence}", get(get_ledger))
        .route("/ledgers/{sequence}/key", get(ledger_key))
        .route("/ranges/prepare", get(prepare_range))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve the ledger API until `shutdown` is cancelled
pub async fn run(config: Config, shutdown: CancellationToken) -> Result<(), AnyError> {
    let address = config.server.bind_addr;

    info!(url = %config.storage.url, "Opening ledger storage");
    let backend = CloudStorageBackend::from_config(&config)
        .map_err(|e| format!("Failed to open storage: {}", e))?;

    let state = AppState::new(backend, shutdown.clone());
    let backend = state.backend.clone();
    let app = router(state);

    let listener = TcpListener::bind(address).await?;
    info!(%address, "Ledger API listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            info!("Shutdown signal received");
        })
        .await?;

    backend.close().await?;
    Ok(())
}
