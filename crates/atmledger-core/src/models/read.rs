use rust_decimal::Decimal;
use time::OffsetDateTime;

use super::{write::TransactionKind, AccountId};

#[derive(Debug, Clone, PartialEq)]
pub struct OpenedAccount {
    pub account_id: AccountId,
    pub balance: Decimal,
    pub created_at: OffsetDateTime,
}

/// Point-in-time copy of one account.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSnapshot {
    pub account_id: AccountId,
    pub balance: Decimal,
    pub created_at: OffsetDateTime,
    pub last_updated: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerListing {
    pub total_accounts: usize,
    pub max_accounts: usize,
    /// In account creation order.
    pub accounts: Vec<AccountSnapshot>,
}

/// Outcome of an applied deposit or withdrawal. `new_balance` and
/// `timestamp` are exactly what was stored.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionReceipt {
    pub account_id: AccountId,
    pub kind: TransactionKind,
    pub new_balance: Decimal,
    pub transaction_amount: Decimal,
    pub timestamp: OffsetDateTime,
}
