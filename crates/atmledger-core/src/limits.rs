use rust_decimal::Decimal;

use crate::storage::LedgerError;

pub const DEFAULT_MAX_ACCOUNTS: usize = 1000;
pub const DEFAULT_MAX_TRANSACTION_AMOUNT: i64 = 10_000;

/// Bounds enforced by a ledger independently of any caller-side validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerLimits {
    pub max_accounts: usize,
    pub max_transaction_amount: Decimal,
}

impl Default for LedgerLimits {
    fn default() -> Self {
        Self {
            max_accounts: DEFAULT_MAX_ACCOUNTS,
            max_transaction_amount: Decimal::from(DEFAULT_MAX_TRANSACTION_AMOUNT),
        }
    }
}

impl LedgerLimits {
    pub fn new(max_accounts: usize, max_transaction_amount: Decimal) -> Self {
        Self {
            max_accounts,
            max_transaction_amount,
        }
    }

    /// Deposit and withdrawal amounts must satisfy `0 < amount <= max_transaction_amount`.
    pub fn check_transaction_amount(&self, amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount {
                amount,
                reason: "amount must be positive",
            });
        }
        if amount > self.max_transaction_amount {
            return Err(LedgerError::InvalidAmount {
                amount,
                reason: "amount exceeds the maximum transaction amount",
            });
        }
        Ok(())
    }

    /// Opening balances must satisfy `0 <= initial_balance <= max_transaction_amount`.
    pub fn check_initial_balance(&self, initial_balance: Decimal) -> Result<(), LedgerError> {
        if initial_balance < Decimal::ZERO {
            return Err(LedgerError::InvalidAmount {
                amount: initial_balance,
                reason: "initial balance must be non-negative",
            });
        }
        if initial_balance > self.max_transaction_amount {
            return Err(LedgerError::InvalidAmount {
                amount: initial_balance,
                reason: "initial balance exceeds the maximum transaction amount",
            });
        }
        Ok(())
    }
}
