use std::fmt::Display;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::AccountId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionCommand {
    pub account_id: AccountId,
    pub kind: TransactionKind,
    pub amount: Decimal,
}

impl TransactionCommand {
    pub fn new(account_id: AccountId, kind: TransactionKind, amount: Decimal) -> Self {
        Self {
            account_id,
            kind,
            amount,
        }
    }

    pub fn deposit(account_id: AccountId, amount: Decimal) -> Self {
        Self::new(account_id, TransactionKind::Deposit, amount)
    }

    pub fn withdrawal(account_id: AccountId, amount: Decimal) -> Self {
        Self::new(account_id, TransactionKind::Withdrawal, amount)
    }
}
