use rust_decimal::{
    prelude::{FromPrimitive, ToPrimitive},
    Decimal,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use atmledger_core::{
    AccountId, AccountSnapshot, LedgerListing, OpenedAccount, TransactionKind, TransactionReceipt,
};

use super::error::ApiError;
use crate::storage::LedgerLimits;

/// Converts a JSON number into a decimal amount. Non-finite or out of range
/// values never reach the ledger.
fn money_from_f64(field: &str, value: f64) -> Result<Decimal, ApiError> {
    Decimal::from_f64(value)
        .map(|amount| amount.normalize())
        .ok_or_else(|| ApiError::InvalidAmount(format!("{} must be a finite number", field)))
}

/// Bounds are checked on the number the client sent. `from_f64` rounds, so a
/// value just past the limit could otherwise land exactly on it.
fn exceeds_limit(value: f64, limits: &LedgerLimits) -> bool {
    let max = limits.max_transaction_amount.to_f64().unwrap_or(f64::MAX);
    value > max
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAccountRequest {
    #[serde(default)]
    pub initial_balance: f64,
}

impl CreateAccountRequest {
    pub fn validated_initial_balance(&self, limits: &LedgerLimits) -> Result<Decimal, ApiError> {
        let amount = money_from_f64("initial_balance", self.initial_balance)?;
        if self.initial_balance < 0.0 || amount < Decimal::ZERO {
            return Err(ApiError::InvalidAmount("Initial balance must be non-negative".to_string()));
        }
        if exceeds_limit(self.initial_balance, limits) || amount > limits.max_transaction_amount {
            return Err(ApiError::InvalidAmount(format!(
                "Initial balance must not exceed {}",
                limits.max_transaction_amount
            )));
        }
        Ok(amount)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRequest {
    pub amount: f64,
}

impl TransactionRequest {
    pub fn validated_amount(&self, limits: &LedgerLimits) -> Result<Decimal, ApiError> {
        let amount = money_from_f64("amount", self.amount)?;
        if self.amount <= 0.0 || amount <= Decimal::ZERO {
            return Err(ApiError::InvalidAmount("Amount must be positive".to_string()));
        }
        if exceeds_limit(self.amount, limits) || amount > limits.max_transaction_amount {
            return Err(ApiError::InvalidAmount(format!(
                "Amount must not exceed {}",
                limits.max_transaction_amount
            )));
        }
        Ok(amount)
    }
}

#[derive(Debug, Serialize)]
pub struct CreateAccountResponse {
    pub account_number: AccountId,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub message: &'static str,
}

impl From<OpenedAccount> for CreateAccountResponse {
    fn from(opened: OpenedAccount) -> Self {
        Self {
            account_number: opened.account_id,
            balance: opened.balance,
            created_at: opened.created_at,
            message: "Account created successfully",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub account_number: AccountId,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub account_number: AccountId,
    #[serde(with = "rust_decimal::serde::float")]
    pub new_balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub transaction_amount: Decimal,
    pub transaction_type: TransactionKind,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl From<TransactionReceipt> for TransactionResponse {
    fn from(receipt: TransactionReceipt) -> Self {
        Self {
            account_number: receipt.account_id,
            new_balance: receipt.new_balance,
            transaction_amount: receipt.transaction_amount,
            transaction_type: receipt.kind,
            timestamp: receipt.timestamp,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccountSummary {
    pub account_number: AccountId,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

impl From<AccountSnapshot> for AccountSummary {
    fn from(snapshot: AccountSnapshot) -> Self {
        Self {
            account_number: snapshot.account_id,
            balance: snapshot.balance,
            created_at: snapshot.created_at,
            last_updated: snapshot.last_updated,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AccountListResponse {
    pub total_accounts: usize,
    pub max_accounts: usize,
    pub accounts: Vec<AccountSummary>,
}

impl From<LedgerListing> for AccountListResponse {
    fn from(listing: LedgerListing) -> Self {
        Self {
            total_accounts: listing.total_accounts,
            max_accounts: listing.max_accounts,
            accounts: listing.accounts.into_iter().map(AccountSummary::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub accounts_count: usize,
    pub max_accounts: usize,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub version: &'static str,
}
