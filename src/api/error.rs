use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::storage::LedgerError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    InvalidAmount(String),
    /// Path segment that cannot name any account.
    #[error("account not found: {0}")]
    UnknownAccount(String),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    code: &'static str,
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Ledger(LedgerError::NotFound(_)) | ApiError::UnknownAccount(_) => StatusCode::NOT_FOUND,
            ApiError::Ledger(LedgerError::CapacityExceeded { .. }) => StatusCode::INSUFFICIENT_STORAGE,
            ApiError::Ledger(LedgerError::InvalidAmount { .. })
            | ApiError::Ledger(LedgerError::InsufficientFunds { .. })
            | ApiError::InvalidAmount(_)
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Ledger(LedgerError::BalanceOverflow(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable failure kind, distinct for every client-visible case.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Ledger(LedgerError::NotFound(_)) | ApiError::UnknownAccount(_) => "not_found",
            ApiError::Ledger(LedgerError::CapacityExceeded { .. }) => "capacity_exceeded",
            ApiError::Ledger(LedgerError::InvalidAmount { .. }) | ApiError::InvalidAmount(_) => "invalid_amount",
            ApiError::Ledger(LedgerError::InsufficientFunds { .. }) => "insufficient_funds",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Ledger(LedgerError::BalanceOverflow(_)) => "internal_error",
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        if status.is_server_error() {
            tracing::error!(code, error = %self, "Request failed");
        } else {
            tracing::warn!(code, error = %self, "Request rejected");
        }

        let message = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody {
            success: false,
            code,
            error: message,
        })).into_response()
    }
}
