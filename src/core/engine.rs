//! Reversal engine: the transactional refund protocol
//!
//! This module provides the synchronous [`ReversalEngine`] plus the
//! precondition chain shared with the async engine. A reversal is one atomic
//! unit of work: locate the payment, validate its eligibility, compute the
//! reversal amounts, and buffer the four writes (merchant debit, consumer
//! credit, status transition, audit-ticket append). All precondition reads
//! happen inside the atomic scope — balances and statuses can be mutated
//! concurrently by other reversal attempts or by unrelated payment and
//! deposit flows, so a check against state read outside the unit would be a
//! check-then-act race.

use crate::core::balance_guard;
use crate::core::traits::{LedgerStore, LedgerTransaction, NoopNotifier, ViewNotifier};
use crate::types::{Party, ReversalError, TicketDraft, TransactionStatus, TransactionType};
use tracing::{info, warn};

/// Synchronous reversal engine
///
/// Constructed with an explicit store value (and optionally a view notifier);
/// holds no ambient globals, which keeps it trivially testable with store
/// doubles.
pub struct ReversalEngine<S: LedgerStore, N: ViewNotifier = NoopNotifier> {
    store: S,
    notifier: N,
}

impl<S: LedgerStore> ReversalEngine<S, NoopNotifier> {
    /// Create an engine over `store` with no view-cache notification
    pub fn new(store: S) -> Self {
        ReversalEngine {
            store,
            notifier: NoopNotifier,
        }
    }
}

impl<S: LedgerStore, N: ViewNotifier> ReversalEngine<S, N> {
    /// Create an engine that signals `notifier` after each successful reversal
    pub fn with_notifier(store: S, notifier: N) -> Self {
        ReversalEngine { store, notifier }
    }

    /// Access the underlying store
    ///
    /// Callers that own the store through the engine (e.g. the admin CLI)
    /// use this to snapshot state after a reversal.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reverse a completed payment
    ///
    /// Runs the full precondition chain and, if every check passes, applies
    /// the bundled write set atomically:
    /// - merchant balance -= net settled amount
    /// - consumer main balance += gross amount
    /// - transaction status COMPLETED -> REFUNDED (with `refunded_at`,
    ///   `refunded_by`)
    /// - one append-only refund ticket
    ///
    /// On success the view notifier fires (outside the atomic scope). On any
    /// failure the unit aborts with zero side effects; nothing is retried
    /// here — only a `StorageFailure` is worth a caller-initiated retry.
    ///
    /// # Arguments
    ///
    /// * `transaction_id` - id of the payment to reverse
    /// * `operator` - opaque accountability string of the human operator
    ///
    /// # Errors
    ///
    /// One of the `ReversalError` variants described in the precondition
    /// chain: `Unauthorized`, `NotFound`, `InvalidState`, `InvalidType`,
    /// `MissingParty`, `AccountNotFound`, `AmbiguousParty`,
    /// `InsufficientFunds`, or `StorageFailure`.
    pub fn reverse(&self, transaction_id: &str, operator: &str) -> Result<(), ReversalError> {
        if operator.trim().is_empty() {
            return Err(ReversalError::Unauthorized);
        }

        match self
            .store
            .run_atomic(|txn| execute_reversal(txn, transaction_id, operator))
        {
            Ok(()) => {
                info!(tx = transaction_id, operator, "refund applied");
                self.notifier.ledger_changed();
                Ok(())
            }
            Err(err) => {
                warn!(tx = transaction_id, %err, "refund rejected");
                Err(err)
            }
        }
    }
}

/// The reversal precondition chain and write set, run inside one atomic unit
///
/// Shared verbatim by the sync and async engines. Precondition order is
/// load-bearing: each failure is a distinct terminal outcome and the first
/// violated check wins.
pub(crate) fn execute_reversal(
    txn: &mut dyn LedgerTransaction,
    transaction_id: &str,
    operator: &str,
) -> Result<(), ReversalError> {
    let tx = txn
        .transaction(transaction_id)?
        .ok_or_else(|| ReversalError::not_found(transaction_id))?;

    if tx.status != TransactionStatus::Completed {
        return Err(ReversalError::invalid_state(transaction_id, tx.status));
    }

    if tx.tx_type != TransactionType::Payment {
        return Err(ReversalError::invalid_type(transaction_id, tx.tx_type));
    }

    let sender_id = tx
        .sender_id
        .clone()
        .ok_or_else(|| ReversalError::missing_party(transaction_id, Party::Consumer))?;

    let merchant_id = tx
        .merchant_party()
        .cloned()
        .ok_or_else(|| ReversalError::missing_party(transaction_id, Party::Merchant))?;

    if txn.consumer(&sender_id)?.is_none() {
        return Err(ReversalError::account_not_found(Party::Consumer, sender_id));
    }

    let merchant = match txn.merchant(&merchant_id)? {
        Some(merchant) => merchant,
        None => {
            // Legacy records sometimes carry a receiver id from the consumer
            // family; surface that explicitly instead of guessing.
            return Err(if txn.consumer(&merchant_id)?.is_some() {
                ReversalError::ambiguous_party(merchant_id)
            } else {
                ReversalError::account_not_found(Party::Merchant, merchant_id)
            });
        }
    };

    // What the consumer paid (gross) vs. what the merchant was credited (net).
    // The consumer is made whole for the gross amount; the merchant gives back
    // only what it actually received.
    let gross = tx.amount;
    let net = tx.settlement_amount();

    if !balance_guard::can_debit(merchant.balance, net) {
        return Err(ReversalError::insufficient_funds(
            merchant_id,
            merchant.balance,
            net,
        ));
    }

    txn.debit_merchant(&merchant_id, net);
    txn.credit_consumer(&sender_id, gross);
    txn.mark_refunded(&tx.id, operator);
    txn.append_ticket(TicketDraft {
        original_tx_id: tx.id.clone(),
        amount: gross,
        net_amount_reversed: net,
        sender_id: merchant_id,
        receiver_id: sender_id,
        executed_by: operator.to_string(),
    });

    Ok(())
}
