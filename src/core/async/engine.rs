//! Asynchronous reversal engine
//!
//! Runs the exact precondition chain of the synchronous engine against an
//! [`AsyncLedgerStore`]. The await around `run_atomic` is the single
//! suspension point of a reversal: that is where a caller's timeout or
//! cancellation policy applies, and cancelling there is safe because the
//! store discards uncommitted writes.
//!
//! The engine is `Clone` and can be shared across tasks; all serialization
//! responsibility stays with the store's atomic primitive — the engine
//! introduces no locks or queues of its own.

use crate::core::engine::execute_reversal;
use crate::core::traits::{AsyncLedgerStore, NoopNotifier, ViewNotifier};
use crate::types::ReversalError;
use std::sync::Arc;
use tracing::{info, warn};

/// Asynchronous reversal engine
///
/// Holds Arc-wrapped collaborators so clones share the same store and
/// notifier.
pub struct AsyncReversalEngine<S: AsyncLedgerStore, N: ViewNotifier = NoopNotifier> {
    store: Arc<S>,
    notifier: Arc<N>,
}

impl<S: AsyncLedgerStore, N: ViewNotifier> Clone for AsyncReversalEngine<S, N> {
    fn clone(&self) -> Self {
        AsyncReversalEngine {
            store: Arc::clone(&self.store),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<S: AsyncLedgerStore> AsyncReversalEngine<S, NoopNotifier> {
    /// Create an engine over `store` with no view-cache notification
    pub fn new(store: Arc<S>) -> Self {
        AsyncReversalEngine {
            store,
            notifier: Arc::new(NoopNotifier),
        }
    }
}

impl<S: AsyncLedgerStore, N: ViewNotifier> AsyncReversalEngine<S, N> {
    /// Create an engine that signals `notifier` after each successful reversal
    pub fn with_notifier(store: Arc<S>, notifier: Arc<N>) -> Self {
        AsyncReversalEngine { store, notifier }
    }

    /// Access the underlying store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Reverse a completed payment
    ///
    /// Semantics are identical to the synchronous
    /// [`ReversalEngine::reverse`](crate::core::engine::ReversalEngine::reverse):
    /// same precondition chain, same atomic write set, same error taxonomy.
    pub async fn reverse(
        &self,
        transaction_id: &str,
        operator: &str,
    ) -> Result<(), ReversalError> {
        if operator.trim().is_empty() {
            return Err(ReversalError::Unauthorized);
        }

        // Owned copies so the unit closure has no borrows tied to this frame.
        let tx_id = transaction_id.to_string();
        let executed_by = operator.to_string();

        let outcome = self
            .store
            .run_atomic(move |txn| execute_reversal(txn, &tx_id, &executed_by))
            .await;

        match outcome {
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
