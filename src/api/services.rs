use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use super::{
    error::ApiError,
    models::{
        HealthResponse, LatestLedgerResponse, LedgerKeyResponse, PrepareRangeResponse, RangeQuery,
    },
    state::AppState,
    validation::{parse_sequence, validate_range},
};
use crate::backend::LedgerBackend;

/// Liveness probe (GET /health)
pub async fn health() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}

/// Most recent ledger available in the store (GET /ledgers/latest)
pub async fn latest_ledger(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let cancel = state.request_token();
    let sequence = state.backend.get_latest_ledger_sequence(&cancel).await?;

    Ok(Json(LatestLedgerResponse { sequence }))
}

/// Raw close metadata of one ledger (GET /ledgers/{sequence})
pub async fn get_ledger(
    State(state): State<AppState>,
    Path(sequence): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let sequence = parse_sequence(&sequence)?;
    let cancel = state.request_token();
    let ledger = state.backend.get_ledger(sequence, &cancel).await?;

    Ok((
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            mime::APPLICATION_OCTET_STREAM.as_ref().to_string(),
        )],
        ledger.into_bytes(),
    ))
}

/// Object key of the batch holding a ledger (GET /ledgers/{sequence}/key)
pub async fn ledger_key(
    State(state): State<AppState>,
    Path(sequence): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let sequence = parse_sequence(&sequence)?;
    let key = state.backend.object_key(sequence)?;

    Ok(Json(LedgerKeyResponse { sequence, key }))
}

/// Check both ends of a range exist (GET /ranges/prepare?from=a&to=b)
pub async fn prepare_range(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let range = validate_range(&query)?;
    let cancel = state.request_token();
    state.backend.prepare_range(range, &cancel).await?;

    Ok(Json(PrepareRangeResponse::prepared(range)))
}

/// Backend counters (GET /metrics)
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.snapshot())
}
