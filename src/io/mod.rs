//! I/O module
//!
//! Handles CSV snapshot persistence for the admin CLI and tests.
//!
//! # Components
//!
//! - `snapshot` - load/save a ledger state as a directory of CSV files

pub mod snapshot;

pub use snapshot::{load_ledger, save_ledger, SnapshotError};
