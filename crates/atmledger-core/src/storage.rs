use rust_decimal::Decimal;

use crate::{
    limits::LedgerLimits,
    models::{
        read::{LedgerListing, OpenedAccount, TransactionReceipt},
        write::TransactionCommand,
        AccountId,
    },
};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("account not found: {0}")]
    NotFound(AccountId),
    #[error("maximum number of accounts ({max_accounts}) reached")]
    CapacityExceeded { max_accounts: usize },
    #[error("invalid amount {amount}: {reason}")]
    InvalidAmount { amount: Decimal, reason: &'static str },
    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: Decimal, requested: Decimal },
    #[error("balance overflow on account {0}")]
    BalanceOverflow(AccountId),
}

/// Registry of independently mutable account balances.
///
/// Implementations must serialize mutations per account, keep balances
/// non-negative, and let operations on distinct accounts run in parallel.
pub trait AccountLedger: Send + Sync {
    fn limits(&self) -> &LedgerLimits;

    // Membership
    fn create_account(&self, initial_balance: Decimal) -> Result<OpenedAccount, LedgerError>;
    fn delete_account(&self, account_id: &AccountId) -> Result<(), LedgerError>;
    fn list_accounts(&self) -> LedgerListing;
    fn account_count(&self) -> usize;

    // Per-account operations
    fn get_balance(&self, account_id: &AccountId) -> Result<Decimal, LedgerError>;
    fn apply(&self, command: &TransactionCommand) -> Result<TransactionReceipt, LedgerError>;

    fn deposit(&self, account_id: &AccountId, amount: Decimal) -> Result<TransactionReceipt, LedgerError> {
        self.apply(&TransactionCommand::deposit(*account_id, amount))
    }

    fn withdraw(&self, account_id: &AccountId, amount: Decimal) -> Result<TransactionReceipt, LedgerError> {
        self.apply(&TransactionCommand::withdrawal(*account_id, amount))
    }
}
