//! Async in-memory ledger store
//!
//! Same document model, transaction handle, and commit path as
//! [`super::memory`], behind a `tokio::sync::Mutex` so units serialize
//! without blocking the runtime. Stands in for a network-backed store in the
//! async engine's tests and in the admin CLI's async strategy.

use crate::core::traits::{AsyncLedgerStore, LedgerTransaction};
use crate::types::ReversalError;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use super::memory::{apply_writes, LedgerState, MemoryTransaction};

/// Tokio-mutex-serialized in-memory ledger store
pub struct AsyncMemoryLedger {
    state: Mutex<LedgerState>,
    fail_next_commit: AtomicBool,
}

impl AsyncMemoryLedger {
    /// Create an empty ledger store
    pub fn new() -> Self {
        AsyncMemoryLedger::from_state(LedgerState::new())
    }

    /// Create a store seeded with `state`
    pub fn from_state(state: LedgerState) -> Self {
        AsyncMemoryLedger {
            state: Mutex::new(state),
            fail_next_commit: AtomicBool::new(false),
        }
    }

    /// Clone the committed state
    pub async fn snapshot(&self) -> LedgerState {
        self.state.lock().await.clone()
    }

    /// Make the next commit fail with a `StorageFailure`, discarding its writes
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }
}

impl Default for AsyncMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AsyncLedgerStore for AsyncMemoryLedger {
    async fn run_atomic<T, F>(&self, unit: F) -> Result<T, ReversalError>
    where
        T: Send,
        F: FnOnce(&mut dyn LedgerTransaction) -> Result<T, ReversalError> + Send,
    {
        let mut guard = self.state.lock().await;

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
