//! Ledger Reversal Engine Library
//! # Overview
//!
//! This library implements the refund/reversal core of a two-sided financial
//! platform: a transactional state-mutation protocol that moves funds from a
//! merchant account back to a consumer wallet, marks the originating payment
//! as refunded, and appends an immutable audit ticket — all-or-nothing.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Transaction, accounts, error taxonomy)
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - The reversal precondition chain and atomic write set
//!   - [`core::balance_guard`] - Pure non-negativity validation
//!   - [`core::traits`] - Storage and view-notification contracts
//! - [`store`] - In-memory store adapters (sync and async) honoring the
//!   atomic-transaction contract
//! - [`io`] - CSV snapshot persistence for the admin CLI
//! - [`cli`] - CLI arguments parsing
//!
//! # The reversal protocol
//!
//! A reversal is one atomic unit of work. Inside it, nine ordered
//! preconditions are checked (operator present, transaction exists, status
//! COMPLETED, type PAYMENT, both parties resolvable, both accounts present,
//! merchant balance covers the net amount); each failure is a distinct typed
//! [`types::ReversalError`] whose message is displayed verbatim to the
//! operator. When all pass, four writes commit together:
//!
//! - merchant balance -= net settled amount
//! - consumer main balance += gross amount
//! - payment status COMPLETED -> REFUNDED (set exactly once)
//! - one append-only REFUND_TICKET audit record
//!
//! Concurrent reversal attempts on one payment linearize through the store's
//! atomic primitive: exactly one succeeds, the rest observe REFUNDED.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod store;
pub mod types;

pub use crate::core::{
    AsyncLedgerStore, AsyncReversalEngine, LedgerStore, LedgerTransaction, NoopNotifier,
    ReversalEngine, ViewNotifier,
};
pub use store::{AsyncMemoryLedger, LedgerState, MemoryLedger};
pub use types::{
    AccountId, ConsumerAccount, MerchantAccount, Party, ReversalError, TicketDraft, Transaction,
    TransactionId, TransactionStatus, TransactionType,
};
