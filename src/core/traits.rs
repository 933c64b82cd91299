//! Core traits for ledger storage and view invalidation
//!
//! These abstractions keep the reversal engine independent of any concrete
//! storage technology: the engine is constructed with an explicit store value
//! (no ambient global client) and talks to it only through `run_atomic`.

use crate::types::{
    AccountId, ConsumerAccount, MerchantAccount, ReversalError, TicketDraft, Transaction,
    TransactionId,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Handle to one in-flight atomic unit of work
///
/// Reads observe the state the unit is serialized against; writes are
/// buffered and only become visible if the whole unit commits. Balance
/// mutations are expressed as relative increments, never as plain
/// assignments, so unrelated fields of the same document do not contend.
pub trait LedgerTransaction {
    /// Read a transaction record
    fn transaction(&mut self, id: &str) -> Result<Option<Transaction>, ReversalError>;

    /// Read a consumer wallet
    fn consumer(&mut self, id: &str) -> Result<Option<ConsumerAccount>, ReversalError>;

    /// Read a merchant account
    fn merchant(&mut self, id: &str) -> Result<Option<MerchantAccount>, ReversalError>;

    /// Buffer a relative debit of a merchant balance
    fn debit_merchant(&mut self, id: &AccountId, amount: Decimal);

    /// Buffer a relative credit of a consumer main balance
    fn credit_consumer(&mut self, id: &AccountId, amount: Decimal);

    /// Buffer the COMPLETED -> REFUNDED transition on a transaction
    ///
    /// The store assigns `refunded_at` at commit time; `operator` lands in
    /// `refunded_by`.
    fn mark_refunded(&mut self, id: &TransactionId, operator: &str);

    /// Buffer the append of a refund audit ticket
    ///
    /// The store assigns the ticket id and timestamp at commit time.
    fn append_ticket(&mut self, draft: TicketDraft);
}

/// Transactionally consistent ledger storage (synchronous)
///
/// `run_atomic` executes `unit` against a [`LedgerTransaction`] handle and
/// guarantees:
/// - if `unit` returns `Err`, no buffered write becomes visible
/// - if the commit itself fails, no buffered write becomes visible and the
///   error is a `StorageFailure`
/// - concurrent units touching overlapping documents serialize, so a
///   balance read inside one unit is never stale by the time its dependent
///   write commits
pub trait LedgerStore {
    /// Execute one atomic unit of work
    fn run_atomic<T, F>(&self, unit: F) -> Result<T, ReversalError>
    where
        F: FnOnce(&mut dyn LedgerTransaction) -> Result<T, ReversalError>;
}

impl<S: LedgerStore> LedgerStore for Arc<S> {
    fn run_atomic<T, F>(&self, unit: F) -> Result<T, ReversalError>
    where
        F: FnOnce(&mut dyn LedgerTransaction) -> Result<T, ReversalError>,
    {
        (**self).run_atomic(unit)
    }
}

/// Transactionally consistent ledger storage (asynchronous)
///
/// Same contract as [`LedgerStore`]; the await point around the unit is the
/// single place where a caller's cancellation or timeout policy applies.
/// Cancellation mid-unit is safe by construction: uncommitted writes are
/// discarded.
#[async_trait]
pub trait AsyncLedgerStore: Send + Sync {
    /// Execute one atomic unit of work
    async fn run_atomic<T, F>(&self, unit: F) -> Result<T, ReversalError>
    where
        T: Send,
        F: FnOnce(&mut dyn LedgerTransaction) -> Result<T, ReversalError> + Send;
}

/// Downstream view-cache invalidation
///
/// Fired exactly once per successful reversal, after the atomic unit has
/// committed. Deliberately fire-and-forget: it is not part of the atomic
/// transaction and its failure cannot affect the ledger.
pub trait ViewNotifier {
    /// Signal that cached ledger views are stale
    fn ledger_changed(&self);
}

/// Default notifier that drops the signal
///
/// Used when the caller polls the store directly and keeps no cached view.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl ViewNotifier for NoopNotifier {
    fn ledger_changed(&self) {}
}

impl<N: ViewNotifier> ViewNotifier for Arc<N> {
    fn ledger_changed(&self) {
        (**self).ledger_changed()
    }
}
