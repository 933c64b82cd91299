//! Ledger store adapters
//!
//! Reference implementations of the storage contracts in [`crate::core::traits`]:
//! - `memory` - mutex-serialized in-memory store with commit-or-discard writes
//! - `async_memory` - the same state behind a tokio mutex for async callers
//!
//! Both share one [`LedgerState`] document model and one buffered-write
//! transaction handle, so sync and async paths commit through identical code.

pub mod async_memory;
pub mod memory;

pub use async_memory::AsyncMemoryLedger;
pub use memory::{LedgerState, MemoryLedger};
