use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use thiserror::Error;

use tally_core::{AccountId, LedgerError};

/// Failure of a request after routing.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The caller stopped waiting; the operation itself kept running.
    #[error("operation did not finish within {0:?}")]
    Timeout(Duration),

    /// The blocking task panicked or was cancelled by the runtime.
    #[error("ledger worker failed: {0}")]
    Worker(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let message = self.to_string();
        match self {
            ApiError::Ledger(e) => ledger_error_to_response(e),
            ApiError::Timeout(_) => json_error(StatusCode::GATEWAY_TIMEOUT, "timeout", message),
            ApiError::Worker(_) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", message),
        }
    }
}

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        LedgerError::AccountNotFound(_) => json_error(StatusCode::NOT_FOUND, "account_not_found", message),
        LedgerError::InsufficientFunds { .. } => {
            json_error(StatusCode::BAD_REQUEST, "insufficient_funds", message)
        }
        LedgerError::InvalidAmount(_) => json_error(StatusCode::BAD_REQUEST, "invalid_amount", message),
        LedgerError::InvalidId(_) => json_error(StatusCode::BAD_REQUEST, "invalid_id", message),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Missing, mistyped or unparseable request bodies keep the extractor's status.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(rejection.status(), "invalid_body", rejection.body_text())
}

pub fn parse_account_id(s: &str) -> Result<AccountId, axum::response::Response> {
    s.parse::<AccountId>().map_err(ledger_error_to_response)
}
