//! atmledger: a concurrent in-memory account ledger served over HTTP.
//!
//! [`storage::InMemoryLedger`] holds the accounts; [`api`] exposes it through
//! axum. Core types live in the `atmledger-core` crate.

pub mod api;
pub mod config;
pub mod storage;
pub mod telemetry;

pub use atmledger_core::{
    AccountId, AccountSnapshot, LedgerListing, OpenedAccount, TransactionCommand,
    TransactionKind, TransactionReceipt,
};
