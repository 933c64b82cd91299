//! Transaction-related types for the ledger reversal engine
//!
//! This module defines the money-movement record family shared by payments,
//! deposits, and refund audit tickets, together with the status lifecycle
//! enforced by the reversal engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transaction identifier
///
/// Opaque, store-generated. New ids are UUID v4 strings, but the engine
/// never inspects the format.
pub type TransactionId = String;

/// Account identifier (consumer wallet or merchant account)
pub type AccountId = String;

/// Transaction types recorded in the ledger
///
/// Only `Payment` transactions are reversible. `RefundTicket` records are
/// append-only audit entries created by the reversal engine itself and are
/// never mutated or reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Consumer pays a merchant
    ///
    /// The only transaction type the reversal engine will reverse.
    Payment,

    /// Consumer tops up their own wallet
    Deposit,

    /// Append-only audit record documenting a reversal
    ///
    /// Created exactly once per successful reversal; references the original
    /// payment via `original_tx_id`. Never itself reversible.
    RefundTicket,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionType::Payment => "PAYMENT",
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::RefundTicket => "REFUND_TICKET",
        };
        f.pad(label)
    }
}

/// Transaction status lifecycle
///
/// Transitions are monotonic for a given record. The only transition the
/// reversal engine performs is `Completed` -> `Refunded`, and `Refunded` is
/// terminal: once a payment has been refunded it can never transition again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Created but not yet settled; not eligible for reversal
    Pending,

    /// Settled; the only status eligible for reversal
    Completed,

    /// Reversed by the engine; terminal
    Refunded,

    /// Settlement failed; not eligible for reversal
    Failed,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Refunded => "REFUNDED",
            TransactionStatus::Failed => "FAILED",
        };
        f.pad(label)
    }
}

/// A money-movement record in the ledger
///
/// One struct covers all record types in the transactions family: payments
/// and deposits written by the (out-of-scope) payment collaborator, and
/// refund audit tickets written by this engine.
///
/// Field notes:
/// - `amount` is the gross amount paid by the sender
/// - `net_amount` is what the receiving merchant was actually credited after
///   fees; absent means "equal to `amount`" (see [`Transaction::settlement_amount`])
/// - `receiver_id` is preferred for party resolution; `merchant_id` is a
///   legacy alias some early records carry instead
/// - `refunded_at` / `refunded_by` are set exactly once, on the
///   COMPLETED -> REFUNDED transition
/// - `original_tx_id`, `executed_by`, and `description` are only populated on
///   refund tickets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique, store-generated identifier
    pub id: TransactionId,

    /// The record type (payment, deposit, or refund ticket)
    #[serde(rename = "type")]
    pub tx_type: TransactionType,

    /// Current lifecycle status
    pub status: TransactionStatus,

    /// The paying account (consumer wallet)
    pub sender_id: Option<AccountId>,

    /// The receiving account (merchant), preferred resolution field
    pub receiver_id: Option<AccountId>,

    /// Legacy alias for the receiving merchant account
    pub merchant_id: Option<AccountId>,

    /// Gross amount paid by the sender, decimal-exact
    pub amount: Decimal,

    /// Amount credited to the merchant after fees; defaults to `amount`
    pub net_amount: Option<Decimal>,

    /// Store-assigned creation time; immutable
    pub timestamp: DateTime<Utc>,

    /// When the reversal was applied (set once, store-assigned)
    pub refunded_at: Option<DateTime<Utc>>,

    /// Operator identity that triggered the reversal (set once)
    pub refunded_by: Option<String>,

    /// Refund tickets only: the payment this ticket documents
    pub original_tx_id: Option<TransactionId>,

    /// Refund tickets only: operator identity that executed the reversal
    pub executed_by: Option<String>,

    /// Refund tickets only: human-readable summary
    pub description: Option<String>,
}

impl Transaction {
    /// Amount the merchant actually received for this transaction
    ///
    /// `net_amount` when recorded, otherwise the gross `amount`. This is the
    /// amount a reversal debits from the merchant.
    pub fn settlement_amount(&self) -> Decimal {
        self.net_amount.unwrap_or(self.amount)
    }

    /// Resolve the merchant-side party of this transaction
    ///
    /// Prefers `receiver_id`; falls back to the legacy `merchant_id` field.
    /// Returns `None` when neither is present.
    pub fn merchant_party(&self) -> Option<&AccountId> {
        self.receiver_id.as_ref().or(self.merchant_id.as_ref())
    }

    /// Build the refund-ticket record for a committed reversal
    ///
    /// Called by store adapters at commit time so that `id` and `timestamp`
    /// are store-assigned, never caller-supplied. The ticket swaps the
    /// original parties: the merchant is the sender (funds flow back) and the
    /// consumer is the receiver.
    pub fn refund_ticket(draft: TicketDraft, id: TransactionId, now: DateTime<Utc>) -> Self {
        let short_ref: String = draft.original_tx_id.chars().take(8).collect();
        Transaction {
            id,
            tx_type: TransactionType::RefundTicket,
            status: TransactionStatus::Completed,
            sender_id: Some(draft.sender_id),
            receiver_id: Some(draft.receiver_id),
            merchant_id: None,
            amount: draft.amount,
            net_amount: Some(draft.net_amount_reversed),
            timestamp: now,
            refunded_at: None,
            refunded_by: None,
            original_tx_id: Some(draft.original_tx_id),
            executed_by: Some(draft.executed_by),
            description: Some(format!("Refund for TX {}", short_ref)),
        }
    }
}

/// The store-independent part of a refund audit ticket
///
/// Produced by the engine inside the atomic scope; the store adapter assigns
/// the record id and timestamp when the write set commits.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketDraft {
    /// The payment being reversed
    pub original_tx_id: TransactionId,

    /// Gross amount credited back to the consumer
    pub amount: Decimal,

    /// Net amount debited from the merchant
    pub net_amount_reversed: Decimal,

    /// The merchant account (it is sending the funds back)
    pub sender_id: AccountId,

    /// The consumer wallet (it is receiving the funds)
    pub receiver_id: AccountId,

    /// Operator identity, recorded for accountability
    pub executed_by: String,
}
