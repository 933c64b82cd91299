//! In-memory ledger store with atomic multi-document transactions
//!
//! This adapter backs the engine in tests and in the admin CLI, which works
//! against CSV snapshots. It honors the full store contract:
//!
//! - writes issued through the transaction handle are buffered, and become
//!   visible only if the whole unit commits
//! - any `Err` from the unit discards every buffered write
//! - concurrent units serialize on one mutex (pessimistic, which satisfies
//!   the contract just as optimistic retry would)
//! - balance mutations are relative increments applied with checked decimal
//!   arithmetic at commit time
//!
//! The store, not the caller, assigns refund timestamps and ticket ids at
//! commit, matching the server-assigned-time rule of the data model.

use crate::core::traits::{LedgerStore, LedgerTransaction};
use crate::types::{
    AccountId, ConsumerAccount, MerchantAccount, ReversalError, TicketDraft, Transaction,
    TransactionId, TransactionStatus,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

/// The three record families of the ledger
///
/// Plain data: construction, seeding, and inspection go straight through the
/// public fields. Store adapters wrap a `LedgerState` to add atomicity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerState {
    /// Consumer wallets by account id
    pub consumers: HashMap<AccountId, ConsumerAccount>,

    /// Merchant accounts by account id
    pub merchants: HashMap<AccountId, MerchantAccount>,

    /// All money-movement records (payments, deposits, refund tickets) by id
    pub transactions: HashMap<TransactionId, Transaction>,
}

impl LedgerState {
    /// Create an empty ledger
    pub fn new() -> Self {
        LedgerState::default()
    }
}

/// One buffered write against the ledger
///
/// Balance ops are relative increments so that two units touching different
/// fields of the same document never need to merge absolute values.
#[derive(Debug, Clone)]
pub(crate) enum WriteOp {
    DebitMerchant {
        id: AccountId,
        amount: Decimal,
    },
    CreditConsumer {
        id: AccountId,
        amount: Decimal,
    },
    MarkRefunded {
        id: TransactionId,
        operator: String,
    },
    AppendTicket(TicketDraft),
}

/// Transaction handle over a `LedgerState`
///
/// Reads come from the serialized state; writes accumulate in a buffer the
/// adapter applies (or discards) after the unit returns.
pub(crate) struct MemoryTransaction<'a> {
    state: &'a LedgerState,
    writes: Vec<WriteOp>,
}

impl<'a> MemoryTransaction<'a> {
    pub(crate) fn new(state: &'a LedgerState) -> Self {
        MemoryTransaction {
            state,
            writes: Vec::new(),
        }
    }

    pub(crate) fn into_writes(self) -> Vec<WriteOp> {
        self.writes
    }
}

impl LedgerTransaction for MemoryTransaction<'_> {
    fn transaction(&mut self, id: &str) -> Result<Option<Transaction>, ReversalError> {
        Ok(self.state.transactions.get(id).cloned())
    }

    fn consumer(&mut self, id: &str) -> Result<Option<ConsumerAccount>, ReversalError> {
        Ok(self.state.consumers.get(id).cloned())
    }

    fn merchant(&mut self, id: &str) -> Result<Option<MerchantAccount>, ReversalError> {
        Ok(self.state.merchants.get(id).cloned())
    }

    fn debit_merchant(&mut self, id: &AccountId, amount: Decimal) {
        self.writes.push(WriteOp::DebitMerchant {
            id: id.clone(),
            amount,
        });
    }

    fn credit_consumer(&mut self, id: &AccountId, amount: Decimal) {
        self.writes.push(WriteOp::CreditConsumer {
            id: id.clone(),
            amount,
        });
    }

    fn mark_refunded(&mut self, id: &TransactionId, operator: &str) {
        self.writes.push(WriteOp::MarkRefunded {
            id: id.clone(),
            operator: operator.to_string(),
        });
    }

    fn append_ticket(&mut self, draft: TicketDraft) {
        self.writes.push(WriteOp::AppendTicket(draft));
    }
}

/// Apply a buffered write set to the state, all-or-none
///
/// Works on a scratch copy and swaps it in only once every op has applied,
/// so a mid-apply failure leaves the committed state untouched.
pub(crate) fn apply_writes(
    state: &mut LedgerState,
    writes: Vec<WriteOp>,
    now: DateTime<Utc>,
) -> Result<(), ReversalError> {
    let mut next = state.clone();

    for op in writes {
        match op {
            WriteOp::DebitMerchant { id, amount } => {
                let doc = next.merchants.get_mut(&id).ok_or_else(|| {
                    ReversalError::storage_failure(format!("merchant {id} vanished before commit"))
                })?;
                doc.balance = doc.balance.checked_sub(amount).ok_or_else(|| {
                    ReversalError::storage_failure(format!("balance underflow on merchant {id}"))
                })?;
            }
            WriteOp::CreditConsumer { id, amount } => {
                let doc = next.consumers.get_mut(&id).ok_or_else(|| {
                    ReversalError::storage_failure(format!("consumer {id} vanished before commit"))
                })?;
                doc.main_balance = doc.main_balance.checked_add(amount).ok_or_else(|| {
                    ReversalError::storage_failure(format!("balance overflow on consumer {id}"))
                })?;
            }
            WriteOp::MarkRefunded { id, operator } => {
                let doc = next.transactions.get_mut(&id).ok_or_else(|| {
                    ReversalError::storage_failure(format!(
                        "transaction {id} vanished before commit"
                    ))
                })?;
                doc.status = TransactionStatus::Refunded;
                doc.refunded_at = Some(now);
                doc.refunded_by = Some(operator);
            }
            WriteOp::AppendTicket(draft) => {
                let ticket =
                    Transaction::refund_ticket(draft, Uuid::new_v4().to_string(), now);
                next.transactions.insert(ticket.id.clone(), ticket);
            }
        }
    }

    *state = next;
    Ok(())
}

/// Mutex-serialized in-memory ledger store
pub struct MemoryLedger {
    state: Mutex<LedgerState>,
    fail_next_commit: AtomicBool,
}

impl MemoryLedger {
    /// Create an empty ledger store
    pub fn new() -> Self {
        MemoryLedger::from_state(LedgerState::new())
    }

    /// Create a store seeded with `state`
    pub fn from_state(state: LedgerState) -> Self {
        MemoryLedger {
            state: Mutex::new(state),
            fail_next_commit: AtomicBool::new(false),
        }
    }

    /// Clone the committed state
    pub fn snapshot(&self) -> LedgerState {
        match self.state.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Make the next commit fail with a `StorageFailure`, discarding its writes
    ///
    /// Test support for the atomicity property: preconditions pass, the
    /// commit dies, and nothing may be observable afterwards.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for MemoryLedger {
    fn run_atomic<T, F>(&self, unit: F) -> Result<T, ReversalError>
    where
        F: FnOnce(&mut dyn LedgerTransaction) -> Result<T, ReversalError>,
    {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| ReversalError::storage_failure("ledger state mutex poisoned"))?;

        let (value, writes) = {
            let mut txn = MemoryTransaction::new(&guard);
            let value = unit(&mut txn)?;
            (value, txn.into_writes())
        };

        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(ReversalError::storage_failure("injected commit failure"));
        }

        apply_writes(&mut guard, writes, Utc::now())?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TransactionStatus, TransactionType};

    fn seeded() -> MemoryLedger {
        let mut state = LedgerState::new();
        state
            .consumers
            .insert("u1".to_string(), ConsumerAccount::new("u1", Decimal::ZERO));
        state.merchants.insert(
            "m1".to_string(),
            MerchantAccount::new("m1", Decimal::new(50000, 2)),
        );
        MemoryLedger::from_state(state)
    }

    #[test]
    fn writes_commit_together() {
        let store = seeded();

        store
            .run_atomic(|txn| {
                txn.debit_merchant(&"m1".to_string(), Decimal::new(9500, 2));
                txn.credit_consumer(&"u1".to_string(), Decimal::new(10000, 2));
                Ok(())
            })
            .unwrap();

        let state = store.snapshot();
        assert_eq!(state.merchants["m1"].balance, Decimal::new(40500, 2));
        assert_eq!(state.consumers["u1"].main_balance, Decimal::new(10000, 2));
    }

    #[test]
    fn unit_error_discards_buffered_writes() {
        let store = seeded();
        let before = store.snapshot();

        let result: Result<(), _> = store.run_atomic(|txn| {
            txn.debit_merchant(&"m1".to_string(), Decimal::new(9500, 2));
            txn.credit_consumer(&"u1".to_string(), Decimal::new(10000, 2));
            Err(ReversalError::not_found("tx1"))
        });

        assert_eq!(result, Err(ReversalError::not_found("tx1")));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn injected_commit_failure_discards_writes_then_clears() {
        let store = seeded();
        let before = store.snapshot();
        store.fail_next_commit();

        let result = store.run_atomic(|txn| {
            txn.credit_consumer(&"u1".to_string(), Decimal::ONE);
            Ok(())
        });
        assert!(matches!(
            result,
            Err(ReversalError::StorageFailure { .. })
        ));
        assert_eq!(store.snapshot(), before);

        // The injection is one-shot; a retry of the same unit commits.
        store
            .run_atomic(|txn| {
                txn.credit_consumer(&"u1".to_string(), Decimal::ONE);
                Ok(())
            })
            .unwrap();
        assert_eq!(store.snapshot().consumers["u1"].main_balance, Decimal::ONE);
    }

    #[test]
    fn ticket_commit_assigns_id_and_timestamp() {
        let store = seeded();

        store
            .run_atomic(|txn| {
                txn.append_ticket(TicketDraft {
                    original_tx_id: "tx1".to_string(),
                    amount: Decimal::new(10000, 2),
                    net_amount_reversed: Decimal::new(9500, 2),
                    sender_id: "m1".to_string(),
                    receiver_id: "u1".to_string(),
                    executed_by: "admin@x".to_string(),
                });
                Ok(())
            })
            .unwrap();

        let state = store.snapshot();
        let tickets: Vec<_> = state
            .transactions
            .values()
            .filter(|t| t.tx_type == TransactionType::RefundTicket)
            .collect();
        assert_eq!(tickets.len(), 1);
        assert!(!tickets[0].id.is_empty());
        assert_eq!(tickets[0].status, TransactionStatus::Completed);
    }

    #[test]
    fn writes_against_vanished_documents_fail_the_whole_commit() {
        let store = seeded();
        let before = store.snapshot();

        let result = store.run_atomic(|txn| {
            // Valid write first: it must not survive the failing one.
            txn.credit_consumer(&"u1".to_string(), Decimal::ONE);
            txn.debit_merchant(&"ghost".to_string(), Decimal::ONE);
            Ok(())
        });

        assert!(matches!(
            result,
            Err(ReversalError::StorageFailure { .. })
        ));
        assert_eq!(store.snapshot(), before);
    }
}
