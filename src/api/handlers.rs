use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use time::OffsetDateTime;

use atmledger_core::{AccountId, TransactionCommand, TransactionKind, TransactionReceipt};

use super::{
    dto::{
        AccountListResponse, BalanceResponse, CreateAccountRequest, CreateAccountResponse,
        HealthResponse, TransactionRequest, TransactionResponse,
    },
    error::ApiError,
    AppState,
};

fn parse_account_id(account_number: &str) -> Result<AccountId, ApiError> {
    account_number
        .parse()
        .map_err(|_| ApiError::UnknownAccount(account_number.to_string()))
}

fn record_account_gauge(state: &AppState) {
    metrics::gauge!("atmledger_accounts", state.ledger.account_count() as f64);
}

pub async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "name": "atmledger",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "GET /health",
            "GET /metrics",
            "POST /accounts",
            "GET /accounts",
            "GET /accounts/{account_number}/balance",
            "POST /accounts/{account_number}/deposit",
            "POST /accounts/{account_number}/withdraw",
            "DELETE /accounts/{account_number}",
        ],
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        accounts_count: state.ledger.account_count(),
        max_accounts: state.ledger.limits().max_accounts,
        timestamp: OffsetDateTime::now_utc(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn render_metrics(State(state): State<AppState>) -> Response {
    match state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn create_account(
    State(state): State<AppState>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateAccountResponse>), ApiError> {
    let Json(request) = payload?;
    let initial_balance = request.validated_initial_balance(state.ledger.limits())?;
    let opened = state.ledger.create_account(initial_balance)?;

    metrics::increment_counter!("atmledger_accounts_created_total");
    record_account_gauge(&state);

    Ok((StatusCode::CREATED, Json(opened.into())))
}

pub async fn list_accounts(State(state): State<AppState>) -> Json<AccountListResponse> {
    Json(state.ledger.list_accounts().into())
}

pub async fn get_balance(
    State(state): State<AppState>,
    Path(account_number): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let account_id = parse_account_id(&account_number)?;
    let balance = state.ledger.get_balance(&account_id)?;
    Ok(Json(BalanceResponse {
        account_number: account_id,
        balance,
    }))
}

pub async fn delete_account(
    State(state): State<AppState>,
    Path(account_number): Path<String>,
) -> Result<StatusCode, ApiError> {
    let account_id = parse_account_id(&account_number)?;
    state.ledger.delete_account(&account_id)?;

    metrics::increment_counter!("atmledger_accounts_deleted_total");
    record_account_gauge(&state);

    Ok(StatusCode::NO_CONTENT)
}

pub async fn deposit(
    State(state): State<AppState>,
    Path(account_number): Path<String>,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> Result<Json<TransactionResponse>, ApiError> {
    transact(&state, &account_number, payload, TransactionKind::Deposit)
}

pub async fn withdraw(
    State(state): State<AppState>,
    Path(account_number): Path<String>,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> Result<Json<TransactionResponse>, ApiError> {
    transact(&state, &account_number, payload, TransactionKind::Withdrawal)
}

fn transact(
    state: &AppState,
    account_number: &str,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
    kind: TransactionKind,
) -> Result<Json<TransactionResponse>, ApiError> {
    let outcome = execute_transaction(state, account_number, payload, kind);

    let label = match &outcome {
        Ok(_) => "applied",
        Err(e) => e.code(),
    };
    metrics::increment_counter!("atmledger_transactions_total", "kind" => kind.as_str(), "outcome" => label);

    outcome.map(|receipt| Json(receipt.into()))
}

fn execute_transaction(
    state: &AppState,
    account_number: &str,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
    kind: TransactionKind,
) -> Result<TransactionReceipt, ApiError> {
    let account_id = parse_account_id(account_number)?;
    let Json(request) = payload?;
    let amount = request.validated_amount(state.ledger.limits())?;
    let receipt = state.ledger.apply(&TransactionCommand::new(account_id, kind, amount))?;
    Ok(receipt)
}
