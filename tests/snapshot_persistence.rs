//! Snapshot persistence round-trip through a reversal
//!
//! Simulates the admin CLI's full path: seed a CSV snapshot, load it, run a
//! reversal, persist, and reload — the reloaded ledger must show exactly the
//! post-reversal state, including the appended audit ticket.

use chrono::{TimeZone, Utc};
use ledger_reversal_engine::io::snapshot::{load_ledger, save_ledger};
use ledger_reversal_engine::{
    ConsumerAccount, LedgerState, MemoryLedger, MerchantAccount, ReversalEngine, Transaction,
    TransactionStatus, TransactionType,
};
use rust_decimal::Decimal;

fn seed_state() -> LedgerState {
    let mut state = LedgerState::new();
    state
        .consumers
        .insert("u1".to_string(), ConsumerAccount::new("u1", Decimal::ZERO));
    state.merchants.insert(
        "m1".to_string(),
        MerchantAccount::new("m1", Decimal::new(50_000, 2)),
    );
    state.transactions.insert(
        "tx1".to_string(),
        Transaction {
            id: "tx1".to_string(),
            tx_type: TransactionType::Payment,
            status: TransactionStatus::Completed,
            sender_id: Some("u1".to_string()),
            receiver_id: Some("m1".to_string()),
            merchant_id: None,
            amount: Decimal::new(10_000, 2),
            net_amount: Some(Decimal::new(9_500, 2)),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            refunded_at: None,
            refunded_by: None,
            original_tx_id: None,
            executed_by: None,
            description: None,
        },
    );
    state
}

#[test]
fn reversal_survives_a_snapshot_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    save_ledger(dir.path(), &seed_state()).unwrap();

    // Load, reverse, persist — the CLI's reverse path.
    let loaded = load_ledger(dir.path()).unwrap();
    let engine = ReversalEngine::new(MemoryLedger::from_state(loaded));
    engine.reverse("tx1", "admin@x").unwrap();
    save_ledger(dir.path(), &engine.store().snapshot()).unwrap();

    let reloaded = load_ledger(dir.path()).unwrap();
    assert_eq!(reloaded.consumers["u1"].main_balance, Decimal::new(10_000, 2));
    assert_eq!(reloaded.merchants["m1"].balance, Decimal::new(40_500, 2));
    assert_eq!(
        reloaded.transactions["tx1"].status,
        TransactionStatus::Refunded
    );
    assert_eq!(
        reloaded.transactions["tx1"].refunded_by.as_deref(),
        Some("admin@x")
    );

    let tickets: Vec<_> = reloaded
        .transactions
        .values()
        .filter(|tx| tx.tx_type == TransactionType::RefundTicket)
        .collect();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].original_tx_id.as_deref(), Some("tx1"));
}
