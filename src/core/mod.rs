//! Core business logic module
//!
//! This module contains the reversal protocol and its contracts:
//! - `traits` - storage and notification abstractions the engine runs against
//! - `engine` - the synchronous reversal engine and shared precondition chain
//! - `balance_guard` - pure non-negativity validation
//! - `async` - asynchronous engine for network-backed stores

pub mod r#async;
pub mod balance_guard;
pub mod engine;
pub mod traits;

pub use engine::ReversalEngine;
pub use r#async::AsyncReversalEngine;
pub use traits::{AsyncLedgerStore, LedgerStore, LedgerTransaction, NoopNotifier, ViewNotifier};
