//! Types module
//!
//! Contains core data structures used throughout the crate.
//! This module organizes types into logical submodules:
//! - `account`: consumer wallet and merchant account records
//! - `transaction`: money-movement records, statuses, and audit-ticket drafts
//! - `error`: the reversal error taxonomy

pub mod account;
pub mod error;
pub mod transaction;

pub use account::{ConsumerAccount, MerchantAccount};
pub use error::{Party, ReversalError};
pub use transaction::{
    AccountId, TicketDraft, Transaction, TransactionId, TransactionStatus, TransactionType,
};
