//! Core types and traits for the atmledger account ledger.
//!
//! This crate provides the `AccountLedger` trait and all associated types,
//! keeping the ledger contract free of any transport or runtime concerns.

pub mod limits;
pub mod models;
pub mod storage;

// Re-export key types at crate root for convenience
pub use limits::LedgerLimits;
pub use models::{AccountId, ParseAccountIdError};
pub use models::read::{AccountSnapshot, LedgerListing, OpenedAccount, TransactionReceipt};
pub use models::write::{TransactionCommand, TransactionKind};
pub use storage::{AccountLedger, LedgerError};
