//! HTTP request layer over an [`AccountLedger`].
//!
//! Handlers validate amounts at the boundary, call the ledger, and translate
//! `LedgerError` into status codes. The ledger itself re-validates every input.

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::storage::AccountLedger;

pub mod dto;
pub mod error;
pub mod handlers;

pub use error::ApiError;

/// Ledger calls block on short per-account critical sections and run inline
/// on the runtime's worker threads.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn AccountLedger>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(ledger: Arc<dyn AccountLedger>, metrics: Option<PrometheusHandle>) -> Self {
        Self { ledger, metrics }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::render_metrics))
        .route("/accounts", post(handlers::create_account).get(handlers::list_accounts))
        .route("/accounts/:account_number", delete(handlers::delete_account))
        .route("/accounts/:account_number/balance", get(handlers::get_balance))
        .route("/accounts/:account_number/deposit", post(handlers::deposit))
        .route("/accounts/:account_number/withdraw", post(handlers::withdraw))
        .with_state(state)
}
