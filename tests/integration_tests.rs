use std::{collections::BTreeSet, sync::Arc, thread, time::Duration};

use atmledger::storage::{AccountLedger, InMemoryLedger, LedgerError, LedgerLimits};
use atmledger::{AccountId, TransactionKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn setup() -> Arc<dyn AccountLedger> {
    setup_with_capacity(1000)
}

fn setup_with_capacity(max_accounts: usize) -> Arc<dyn AccountLedger> {
    Arc::new(InMemoryLedger::new(LedgerLimits::new(max_accounts, dec!(10000))))
}

#[test]
fn test_account_lifecycle_scenario() {
    let ledger = setup();

    let opened = ledger.create_account(dec!(500.0)).unwrap();
    assert_eq!(opened.balance, dec!(500));
    let id = opened.account_id;

    let receipt = ledger.deposit(&id, dec!(250.0)).unwrap();
    assert_eq!(receipt.new_balance, dec!(750));
    assert_eq!(receipt.kind, TransactionKind::Deposit);

    let receipt = ledger.withdraw(&id, dec!(100.0)).unwrap();
    assert_eq!(receipt.new_balance, dec!(650));
    assert_eq!(receipt.kind, TransactionKind::Withdrawal);

    match ledger.withdraw(&id, dec!(1000.0)) {
        Err(LedgerError::InsufficientFunds { balance, requested }) => {
            assert_eq!(balance, dec!(650));
            assert_eq!(requested, dec!(1000));
        }
        other => panic!("Expected InsufficientFunds, got {:?}", other),
    }
    assert_eq!(ledger.get_balance(&id).unwrap(), dec!(650));

    ledger.delete_account(&id).unwrap();
    assert_eq!(ledger.get_balance(&id), Err(LedgerError::NotFound(id)));
}

#[test]
fn test_concurrent_deposits_and_withdrawals_conserve_balance() {
    let ledger = setup();
    let id = ledger.create_account(dec!(10000.0)).unwrap().account_id;

    const WORKERS: usize = 50;
    const OPERATIONS: usize = 20;

    let handles: Vec<_> = (0..WORKERS)
        .map(|_| {
            let ledger = ledger.clone();
            thread::spawn(move || {
                let mut deposits = 0u32;
                let mut withdrawals = 0u32;
                for i in 0..OPERATIONS {
                    if i % 2 == 0 {
                        ledger.deposit(&id, dec!(50.0)).unwrap();
                        deposits += 1;
                    } else {
                        ledger.withdraw(&id, dec!(25.0)).unwrap();
                        withdrawals += 1;
                    }
                }
                (deposits, withdrawals)
            })
        })
        .collect();

    let (deposits, withdrawals) = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .fold((0u32, 0u32), |acc, (d, w)| (acc.0 + d, acc.1 + w));

    assert_eq!(deposits, 500);
    assert_eq!(withdrawals, 500);

    let expected = dec!(10000) + dec!(50) * Decimal::from(deposits) - dec!(25) * Decimal::from(withdrawals);
    assert_eq!(ledger.get_balance(&id).unwrap(), expected);
    assert_eq!(expected, dec!(22500));
}

#[test]
fn test_parallel_accounts_are_isolated() {
    let ledger = setup();
    let accounts: Vec<(AccountId, Decimal)> = (1..=5i64)
        .map(|i| {
            let initial = Decimal::from(i * 1000);
            (ledger.create_account(initial).unwrap().account_id, initial)
        })
        .collect();

    let mut handles = Vec::new();
    for (id, _) in &accounts {
        for _ in 0..10 {
            let ledger = ledger.clone();
            let id = *id;
            handles.push(thread::spawn(move || {
                for _ in 0..10 {
                    ledger.deposit(&id, dec!(7.5)).unwrap();
                    ledger.withdraw(&id, dec!(2.5)).unwrap();
                }
            }));
        }
    }

    for handle in handles {
        handle.join().unwrap();
    }

    // 10 workers x 10 rounds x (7.5 - 2.5) per account
    for (id, initial) in accounts {
        assert_eq!(ledger.get_balance(&id).unwrap(), initial + dec!(500));
    }
}

#[test]
fn test_withdrawals_never_overdraw_under_contention() {
    let ledger = setup();
    let id = ledger.create_account(dec!(100)).unwrap().account_id;

    let handles: Vec<_> = (0..50)
        .map(|_| {
            let ledger = ledger.clone();
            thread::spawn(move || ledger.withdraw(&id, dec!(10)))
        })
        .collect();

    let mut succeeded = 0;
    let mut refused = 0;
    for handle in handles {
        match handle.join().unwrap() {
            Ok(receipt) => {
                assert!(receipt.new_balance >= Decimal::ZERO);
                succeeded += 1;
            }
            Err(LedgerError::InsufficientFunds { .. }) => refused += 1,
            Err(e) => panic!("Unexpected error: {:?}", e),
        }
    }

    assert_eq!(succeeded, 10);
    assert_eq!(refused, 40);
    assert_eq!(ledger.get_balance(&id).unwrap(), Decimal::ZERO);
}

#[test]
fn test_receipts_are_linearizable() {
    let ledger = setup();
    let id = ledger.create_account(dec!(0)).unwrap().account_id;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ledger = ledger.clone();
            thread::spawn(move || {
                (0..25)
                    .map(|_| ledger.deposit(&id, dec!(1)).unwrap().new_balance)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let observed: BTreeSet<Decimal> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();

    // Every deposit saw a distinct predecessor: no two receipts share a balance.
    let expected: BTreeSet<Decimal> = (1..=200i64).map(Decimal::from).collect();
    assert_eq!(observed, expected);
    assert_eq!(ledger.get_balance(&id).unwrap(), dec!(200));
}

#[test]
fn test_balance_read_is_idempotent() {
    let ledger = setup();
    let id = ledger.create_account(dec!(123.45)).unwrap().account_id;

    let first = ledger.get_balance(&id).unwrap();
    let second = ledger.get_balance(&id).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, dec!(123.45));
}

#[test]
fn test_deleted_account_rejects_every_operation() {
    let ledger = setup();
    let id = ledger.create_account(dec!(10)).unwrap().account_id;
    ledger.delete_account(&id).unwrap();

    assert_eq!(ledger.get_balance(&id), Err(LedgerError::NotFound(id)));
    assert_eq!(ledger.deposit(&id, dec!(1)), Err(LedgerError::NotFound(id)));
    assert_eq!(ledger.withdraw(&id, dec!(1)), Err(LedgerError::NotFound(id)));
    assert_eq!(ledger.delete_account(&id), Err(LedgerError::NotFound(id)));
    assert_eq!(ledger.account_count(), 0);
}

#[test]
fn test_unknown_account_is_not_found() {
    let ledger = setup();
    let unknown = AccountId::generate();

    assert_eq!(ledger.get_balance(&unknown), Err(LedgerError::NotFound(unknown)));
    assert_eq!(ledger.deposit(&unknown, dec!(5)), Err(LedgerError::NotFound(unknown)));
    assert_eq!(ledger.delete_account(&unknown), Err(LedgerError::NotFound(unknown)));
}

#[test]
fn test_capacity_enforced_and_released() {
    let ledger = setup_with_capacity(3);
    let ids: Vec<AccountId> = (0..3)
        .map(|_| ledger.create_account(Decimal::ZERO).unwrap().account_id)
        .collect();

    assert_eq!(
        ledger.create_account(Decimal::ZERO),
        Err(LedgerError::CapacityExceeded { max_accounts: 3 })
    );

    ledger.delete_account(&ids[1]).unwrap();
    assert!(ledger.create_account(Decimal::ZERO).is_ok());
    assert_eq!(ledger.account_count(), 3);
}

#[test]
fn test_concurrent_creates_respect_capacity() {
    let ledger = setup_with_capacity(20);

    let handles: Vec<_> = (0..64)
        .map(|_| {
            let ledger = ledger.clone();
            thread::spawn(move || ledger.create_account(dec!(1)))
        })
        .collect();

    let created = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|r| r.is_ok())
        .count();

    assert_eq!(created, 20);
    assert_eq!(ledger.account_count(), 20);
    assert_eq!(ledger.list_accounts().accounts.len(), 20);
}

#[test]
fn test_invalid_amounts_rejected_before_lookup() {
    let ledger = setup();
    let unknown = AccountId::generate();

    // Amount validation runs first, so even an unknown account reports InvalidAmount.
    for amount in [dec!(0), dec!(-1), dec!(10000.01)] {
        assert!(matches!(ledger.deposit(&unknown, amount), Err(LedgerError::InvalidAmount { .. })));
        assert!(matches!(ledger.withdraw(&unknown, amount), Err(LedgerError::InvalidAmount { .. })));
    }

    assert!(matches!(ledger.create_account(dec!(-0.01)), Err(LedgerError::InvalidAmount { .. })));
    assert!(matches!(ledger.create_account(dec!(10000.01)), Err(LedgerError::InvalidAmount { .. })));
    assert_eq!(ledger.account_count(), 0);
}

#[test]
fn test_delete_racing_transactions_loses_nothing() {
    let ledger = setup();
    let id = ledger.create_account(Decimal::ZERO).unwrap().account_id;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ledger = ledger.clone();
            thread::spawn(move || {
                let mut applied = Vec::new();
                for _ in 0..100_000 {
                    match ledger.deposit(&id, dec!(1)) {
                        Ok(receipt) => applied.push(receipt.new_balance),
                        Err(LedgerError::NotFound(_)) => break,
                        Err(e) => panic!("Unexpected error: {:?}", e),
                    }
                }
                applied
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(20));
    ledger.delete_account(&id).unwrap();

    let applied: Vec<Decimal> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();

    // Receipts are exactly 1..=n: every acknowledged deposit landed before removal.
    let highest = applied.iter().copied().max().unwrap_or(Decimal::ZERO);
    assert_eq!(highest, Decimal::from(applied.len()));
    assert_eq!(ledger.deposit(&id, dec!(1)), Err(LedgerError::NotFound(id)));
}

#[test]
fn test_listing_is_consistent() {
    let ledger = setup();
    let first = ledger.create_account(dec!(10)).unwrap().account_id;
    let second = ledger.create_account(dec!(20)).unwrap().account_id;
    ledger.deposit(&second, dec!(5)).unwrap();

    let listing = ledger.list_accounts();
    assert_eq!(listing.total_accounts, 2);
    assert_eq!(listing.max_accounts, 1000);
    assert_eq!(listing.accounts[0].account_id, first);
    assert_eq!(listing.accounts[1].account_id, second);
    assert_eq!(listing.accounts[1].balance, dec!(25));
    assert!(listing.accounts[1].last_updated >= listing.accounts[1].created_at);
}
