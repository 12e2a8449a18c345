//! Response bodies for the ledger HTTP endpoints.
//!
//! Ledger payloads themselves are served raw (`application/octet-stream`);
//! everything else is JSON.

use serde::{Deserialize, Serialize};

use crate::backend::Range;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LatestLedgerResponse {
    pub sequence: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LedgerKeyResponse {
    pub sequence: u32,
    pub key: String,
}

/// Query string of `GET /ranges/prepare`
#[derive(Debug, Deserialize, Default)]
pub struct RangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PrepareRangeResponse {
    pub range: String,
    pub prepared: bool,
}

impl PrepareRangeResponse {
    pub fn prepared(range: Range) -> Self {
        Self {
            range: range.to_string(),
            prepared: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
