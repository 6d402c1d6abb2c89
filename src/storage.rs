use std::{collections::BTreeMap, sync::{Arc, atomic::{AtomicU64, Ordering}}};

use dashmap::DashMap;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use time::OffsetDateTime;

use atmledger_core::{
    AccountId, AccountSnapshot, LedgerListing, OpenedAccount,
    TransactionCommand, TransactionKind, TransactionReceipt,
};

// Re-export core ledger types so callers only need crate::storage::*
pub use atmledger_core::storage::{AccountLedger, LedgerError};
pub use atmledger_core::LedgerLimits;

/// Per-account lock together with the record it guards. The record is taken
/// out on deletion, so a handle cloned before the delete observes `None`.
type AccountSlot = Arc<Mutex<Option<AccountRecord>>>;

#[derive(Debug, Clone)]
struct AccountRecord {
    id: AccountId,
    sequence: u64,
    balance: Decimal,
    created_at: OffsetDateTime,
    last_updated: OffsetDateTime,
}

impl AccountRecord {
    fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot {
            account_id: self.id,
            balance: self.balance,
            created_at: self.created_at,
            last_updated: self.last_updated,
        }
    }
}

/// In-memory ledger with two-tier locking.
///
/// `membership` is the ledger-wide lock. Create, delete and listing take it;
/// it indexes every live account by creation sequence. Balance reads and
/// transactions only look the account up in `accounts` and lock its slot, so
/// traffic on different accounts never contends. Lock order is always
/// membership first, then slot.
pub struct InMemoryLedger {
    limits: LedgerLimits,
    membership: Mutex<BTreeMap<u64, AccountId>>,
    accounts: DashMap<AccountId, AccountSlot>,
    sequence_counter: AtomicU64,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new(LedgerLimits::default())
    }
}

impl InMemoryLedger {
    pub fn new(limits: LedgerLimits) -> Self {
        Self {
            limits,
            membership: Mutex::new(BTreeMap::new()),
            accounts: DashMap::new(),
            sequence_counter: AtomicU64::new(1),
        }
    }

    fn next_sequence(&self) -> u64 {
        self.sequence_counter.fetch_add(1, Ordering::SeqCst)
    }

    /// Clones the slot handle out of the map. The shard guard is released
    /// before returning, so callers never wait on a slot while holding it.
    fn slot(&self, account_id: &AccountId) -> Result<AccountSlot, LedgerError> {
        self.accounts
            .get(account_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(LedgerError::NotFound(*account_id))
    }
}

impl AccountLedger for InMemoryLedger {
    fn limits(&self) -> &LedgerLimits {
        &self.limits
    }

    fn create_account(&self, initial_balance: Decimal) -> Result<OpenedAccount, LedgerError> {
        self.limits.check_initial_balance(initial_balance)?;

        let mut membership = self.membership.lock();
        if membership.len() >= self.limits.max_accounts {
            return Err(LedgerError::CapacityExceeded {
                max_accounts: self.limits.max_accounts,
            });
        }

        let id = AccountId::generate();
        let sequence = self.next_sequence();
        let now = OffsetDateTime::now_utc();

        let record = AccountRecord {
            id,
            sequence,
            balance: initial_balance,
            created_at: now,
            last_updated: now,
        };
        self.accounts.insert(id, Arc::new(Mutex::new(Some(record))));
        membership.insert(sequence, id);

        tracing::info!(account_id = %id, balance = %initial_balance, "Account created");

        Ok(OpenedAccount {
            account_id: id,
            balance: initial_balance,
            created_at: now,
        })
    }

    fn delete_account(&self, account_id: &AccountId) -> Result<(), LedgerError> {
        let mut membership = self.membership.lock();
        let slot = self.slot(account_id)?;

        // Waits for any in-flight transaction on this account to finish.
        let mut guard = slot.lock();
        let record = guard.take().ok_or(LedgerError::NotFound(*account_id))?;
        self.accounts.remove(account_id);
        membership.remove(&record.sequence);

        tracing::info!(account_id = %account_id, final_balance = %record.balance, "Account deleted");
        Ok(())
    }

    fn list_accounts(&self) -> LedgerListing {
        let membership = self.membership.lock();
        let accounts: Vec<AccountSnapshot> = membership
            .values()
            .filter_map(|id| self.slot(id).ok())
            .filter_map(|slot| {
                let guard = slot.lock();
                guard.as_ref().map(AccountRecord::snapshot)
            })
            .collect();

        LedgerListing {
            total_accounts: accounts.len(),
            max_accounts: self.limits.max_accounts,
            accounts,
        }
    }

    fn account_count(&self) -> usize {
        self.membership.lock().len()
    }

    fn get_balance(&self, account_id: &AccountId) -> Result<Decimal, LedgerError> {
        let slot = self.slot(account_id)?;
        let guard = slot.lock();
        let record = guard.as_ref().ok_or(LedgerError::NotFound(*account_id))?;
        tracing::debug!(account_id = %account_id, balance = %record.balance, "Balance read");
        Ok(record.balance)
    }

    fn apply(&self, command: &TransactionCommand) -> Result<TransactionReceipt, LedgerError> {
        self.limits.check_transaction_amount(command.amount)?;

        let slot = self.slot(&command.account_id)?;
        let mut guard = slot.lock();
        let record = guard.as_mut().ok_or(LedgerError::NotFound(command.account_id))?;

        let old_balance = record.balance;
        let new_balance = match command.kind {
            TransactionKind::Deposit => old_balance
                .checked_add(command.amount)
                .ok_or(LedgerError::BalanceOverflow(command.account_id))?,
            TransactionKind::Withdrawal => {
                let remaining = old_balance
                    .checked_sub(command.amount)
                    .ok_or(LedgerError::BalanceOverflow(command.account_id))?;
                if remaining < Decimal::ZERO {
                    return Err(LedgerError::InsufficientFunds {
                        balance: old_balance,
                        requested: command.amount,
                    });
                }
                remaining
            }
        };

        let now = OffsetDateTime::now_utc();
        record.balance = new_balance;
        record.last_updated = now;

        tracing::info!(
            account_id = %command.account_id,
            kind = %command.kind,
            amount = %command.amount,
            old_balance = %old_balance,
            new_balance = %new_balance,
            "Transaction applied"
        );

        Ok(TransactionReceipt {
            account_id: command.account_id,
            kind: command.kind,
            new_balance,
            transaction_amount: command.amount,
            timestamp: now,
        })
    }
}
