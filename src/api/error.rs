use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use super::models::ErrorResponse;
use super::validation::RequestValidationError;
use crate::backend::{BackendError, ErrorKind};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestValidationError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Backend(err) => match err.kind() {
                ErrorKind::Config => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Range => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::CorruptData => StatusCode::BAD_GATEWAY,
                ErrorKind::Cancelled | ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "INVALID_REQUEST",
            ApiError::Backend(err) => match err.kind() {
                ErrorKind::Config => "INVALID_CONFIG",
                ErrorKind::NotFound => "NOT_FOUND",
                ErrorKind::Range => "OUT_OF_RANGE",
                ErrorKind::CorruptData => "CORRUPT_DATA",
                ErrorKind::Cancelled => "CANCELLED",
                ErrorKind::Unavailable => "STORAGE_UNAVAILABLE",
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let body = ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
