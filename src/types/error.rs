//! Error types for the ledger reversal engine
//!
//! Every failure here is an expected, recoverable-by-operator outcome, not a
//! crash: the presentation layer displays the `Display` message verbatim, so
//! each variant carries enough context to produce a distinct, actionable
//! message for the operator.
//!
//! # Error Categories
//!
//! - **Business-rule failures**: the reversal was rejected by a precondition
//!   (missing operator identity, wrong status or type, unknown parties,
//!   insufficient merchant funds). Retrying with the same arguments cannot
//!   change the outcome.
//! - **Storage failures**: the atomic commit itself failed (infrastructure).
//!   The only category worth retrying; preconditions are re-evaluated on
//!   fresh state, so a retry after the reversal already applied simply
//!   yields `InvalidState` instead of a double refund.

use super::transaction::{AccountId, TransactionId, TransactionStatus, TransactionType};
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// The side of a payment a precondition failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    /// The paying consumer (original sender)
    Consumer,
    /// The receiving merchant (original receiver)
    Merchant,
}

impl Party {
    /// The role the party plays on the original payment
    pub fn role(&self) -> &'static str {
        match self {
            Party::Consumer => "Sender",
            Party::Merchant => "Receiver",
        }
    }

    /// The account-family noun used in operator-facing messages
    pub fn holder(&self) -> &'static str {
        match self {
            Party::Consumer => "Consumer wallet",
            Party::Merchant => "Merchant account",
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Party::Consumer => "Consumer",
            Party::Merchant => "Merchant",
        };
        write!(f, "{}", label)
    }
}

/// Main error type for the reversal engine
///
/// Each variant corresponds to one terminal failure of the reversal
/// precondition chain, plus `StorageFailure` for the atomic commit itself.
/// Any of these returned from inside the atomic scope aborts every buffered
/// write: no partial state change is ever observable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReversalError {
    /// The operator identity string was empty
    ///
    /// The engine treats the identity as an opaque accountability string and
    /// never re-validates its authenticity, but it must be present.
    #[error("Unauthorized access: operator identity is missing")]
    Unauthorized,

    /// No transaction exists with the requested id
    #[error("Transaction {tx} not found")]
    NotFound {
        /// The id that failed to resolve
        tx: TransactionId,
    },

    /// The transaction is not in COMPLETED status
    ///
    /// PENDING, FAILED, and REFUNDED are distinct, actionable cases for the
    /// operator, so the current status is part of the message. REFUNDED here
    /// is also the at-most-once gate: a second reversal attempt lands on this
    /// variant rather than double-refunding.
    #[error("Transaction {tx} is currently {status}; only COMPLETED transactions can be refunded")]
    InvalidState {
        /// The transaction that was rejected
        tx: TransactionId,
        /// Its current status
        status: TransactionStatus,
    },

    /// The transaction is not of a reversible type
    ///
    /// Only PAYMENT transactions are reversible; deposits and refund tickets
    /// are not.
    #[error("Transaction {tx} is a {tx_type}; only PAYMENT transactions can be refunded")]
    InvalidType {
        /// The transaction that was rejected
        tx: TransactionId,
        /// Its actual type
        tx_type: TransactionType,
    },

    /// The sender or receiver/merchant id is absent from the transaction
    #[error("Cannot identify the {party} ({}) on transaction {tx}", .party.role())]
    MissingParty {
        /// The transaction with the missing party
        tx: TransactionId,
        /// Which side could not be identified
        party: Party,
    },

    /// A referenced account document does not exist
    #[error("{} {account} not found; cannot reverse funds", .party.holder())]
    AccountNotFound {
        /// Which account family was searched
        party: Party,
        /// The id that failed to resolve
        account: AccountId,
    },

    /// The receiver id resolves to a consumer wallet, not a merchant account
    ///
    /// Legacy records sometimes carry a receiver id from the wrong account
    /// family. Rather than silently guessing, the engine surfaces the
    /// mismatch explicitly.
    #[error("Receiver {account} resolves to a consumer wallet, not a merchant account")]
    AmbiguousParty {
        /// The id found in the consumer family
        account: AccountId,
    },

    /// The merchant balance cannot cover the reversal debit
    ///
    /// Carries both the available and required amounts so the operator sees
    /// precisely how short the merchant is.
    #[error("Refund aborted: merchant {merchant} has insufficient funds ({available}) to cover this reversal ({required})")]
    InsufficientFunds {
        /// The merchant that would have gone negative
        merchant: AccountId,
        /// Current merchant balance
        available: Decimal,
        /// Net amount the reversal needs to debit
        required: Decimal,
    },

    /// The atomic transaction could not commit
    ///
    /// Infrastructure-level, distinct from every business failure above.
    /// Safe for the caller to retry with the same arguments.
    #[error("Ledger commit failed: {message}")]
    StorageFailure {
        /// Description of the infrastructure fault
        message: String,
    },
}

// Helper functions for creating common errors

impl ReversalError {
    /// Create a NotFound error
    pub fn not_found(tx: impl Into<TransactionId>) -> Self {
        ReversalError::NotFound { tx: tx.into() }
    }

    /// Create an InvalidState error
    pub fn invalid_state(tx: impl Into<TransactionId>, status: TransactionStatus) -> Self {
        ReversalError::InvalidState {
            tx: tx.into(),
            status,
        }
    }

    /// Create an InvalidType error
    pub fn invalid_type(tx: impl Into<TransactionId>, tx_type: TransactionType) -> Self {
        ReversalError::InvalidType {
            tx: tx.into(),
            tx_type,
        }
    }

    /// Create a MissingParty error
    pub fn missing_party(tx: impl Into<TransactionId>, party: Party) -> Self {
        ReversalError::MissingParty {
            tx: tx.into(),
            party,
        }
    }

    /// Create an AccountNotFound error
    pub fn account_not_found(party: Party, account: impl Into<AccountId>) -> Self {
        ReversalError::AccountNotFound {
            party,
            account: account.into(),
        }
    }

    /// Create an AmbiguousParty error
    pub fn ambiguous_party(account: impl Into<AccountId>) -> Self {
        ReversalError::AmbiguousParty {
            account: account.into(),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(
        merchant: impl Into<AccountId>,
        available: Decimal,
        required: Decimal,
    ) -> Self {
        ReversalError::InsufficientFunds {
            merchant: merchant.into(),
            available,
            required,
        }
    }

    /// Create a StorageFailure error
    pub fn storage_failure(message: impl Into<String>) -> Self {
        ReversalError::StorageFailure {
            message: message.into(),
        }
    }

    /// Whether the caller may retry this failure with the same arguments
    ///
    /// Only `StorageFailure` qualifies: business-rule failures are stable
    /// under retry, and the engine never retries anything itself.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ReversalError::StorageFailure { .. })
    }
}
