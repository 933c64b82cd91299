//! Asynchronous reversal engine
//!
//! Mirrors the synchronous core for stores backed by network I/O, where the
//! atomic-transaction call is the one suspension point.

pub mod engine;

pub use engine::AsyncReversalEngine;
