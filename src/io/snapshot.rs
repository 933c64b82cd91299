//! CSV snapshot persistence for ledger state
//!
//! The admin CLI works against a snapshot directory holding one CSV file per
//! record family: `consumers.csv`, `merchants.csv`, `transactions.csv`.
//! Loading builds a [`LedgerState`]; saving writes the families back with
//! deterministic row ordering (accounts by id, transactions oldest first) so
//! snapshots diff cleanly.

use crate::store::LedgerState;
use crate::types::{ConsumerAccount, MerchantAccount, Transaction};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

/// File names inside a snapshot directory
const CONSUMERS_FILE: &str = "consumers.csv";
const MERCHANTS_FILE: &str = "merchants.csv";
const TRANSACTIONS_FILE: &str = "transactions.csv";

/// Errors while reading or writing snapshot files
///
/// Kept separate from [`crate::types::ReversalError`]: snapshot I/O is a
/// presentation-side concern, not an outcome of the reversal protocol.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// A snapshot file is missing from the directory
    #[error("Snapshot file not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error while reading or writing a snapshot file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV content
    #[error("CSV error in {file}: {source}")]
    Csv {
        /// The file that failed to parse or serialize
        file: String,
        /// The underlying csv error
        source: csv::Error,
    },
}

/// Load a full ledger state from a snapshot directory
pub fn load_ledger(dir: &Path) -> Result<LedgerState, SnapshotError> {
    let mut state = LedgerState::new();

    for consumer in read_records::<ConsumerAccount>(&dir.join(CONSUMERS_FILE))? {
        state.consumers.insert(consumer.id.clone(), consumer);
    }
    for merchant in read_records::<MerchantAccount>(&dir.join(MERCHANTS_FILE))? {
        state.merchants.insert(merchant.id.clone(), merchant);
    }
    for tx in read_records::<Transaction>(&dir.join(TRANSACTIONS_FILE))? {
        state.transactions.insert(tx.id.clone(), tx);
    }

    Ok(state)
}

/// Write a full ledger state back to a snapshot directory
pub fn save_ledger(dir: &Path, state: &LedgerState) -> Result<(), SnapshotError> {
    let mut consumers: Vec<&ConsumerAccount> = state.consumers.values().collect();
    consumers.sort_by(|a, b| a.id.cmp(&b.id));
    write_records(&dir.join(CONSUMERS_FILE), &consumers)?;

    let mut merchants: Vec<&MerchantAccount> = state.merchants.values().collect();
    merchants.sort_by(|a, b| a.id.cmp(&b.id));
    write_records(&dir.join(MERCHANTS_FILE), &merchants)?;

    let mut transactions: Vec<&Transaction> = state.transactions.values().collect();
    transactions.sort_by(|a, b| (a.timestamp, &a.id).cmp(&(b.timestamp, &b.id)));
    write_records(&dir.join(TRANSACTIONS_FILE), &transactions)?;

    Ok(())
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SnapshotError> {
    if !path.exists() {
        return Err(SnapshotError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut records = Vec::new();
    for result in reader.deserialize() {
        let record = result.map_err(|source| SnapshotError::Csv {
            file: path.display().to_string(),
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

fn write_records<T: Serialize>(path: &Path, records: &[&T]) -> Result<(), SnapshotError> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for record in records {
        writer.serialize(record).map_err(|source| SnapshotError::Csv {
            file: path.display().to_string(),
            source,
        })?;
    }
    writer.flush()?;
    Ok(())
}
