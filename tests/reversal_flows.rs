//! End-to-end reversal flow tests
//!
//! These tests exercise the full protocol through the public API: engine +
//! in-memory store honoring the atomic-transaction contract. They cover:
//! - the happy path with fee-bearing payments (gross credited, net debited)
//! - every precondition failure, each leaving the ledger untouched
//! - idempotence under retry (at-most-once reversal)
//! - atomicity under an injected commit failure
//! - exact decimal conservation
//! - audit-ticket completeness
//! - linearization of concurrent reversal attempts

use chrono::Utc;
use ledger_reversal_engine::{
    ConsumerAccount, LedgerState, MemoryLedger, MerchantAccount, ReversalEngine, ReversalError,
    Transaction, TransactionStatus, TransactionType,
};
use rstest::rstest;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::thread;

fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

fn payment_tx(id: &str, status: TransactionStatus, tx_type: TransactionType) -> Transaction {
    Transaction {
        id: id.to_string(),
        tx_type,
        status,
        sender_id: Some("u1".to_string()),
        receiver_id: Some("m1".to_string()),
        merchant_id: None,
        amount: money(10_000),
        net_amount: Some(money(9_500)),
        timestamp: Utc::now(),
        refunded_at: None,
        refunded_by: None,
        original_tx_id: None,
        executed_by: None,
        description: None,
    }
}

/// Scenario A seed: u1 paid m1 100.00 gross, m1 was credited 95.00 net,
/// m1 holds 500.00, u1 holds 0.
fn scenario_state(merchant_balance: Decimal) -> LedgerState {
    let mut state = LedgerState::new();
    state
        .consumers
        .insert("u1".to_string(), ConsumerAccount::new("u1", Decimal::ZERO));
    state.merchants.insert(
        "m1".to_string(),
        MerchantAccount::new("m1", merchant_balance),
    );
    state.transactions.insert(
        "tx1".to_string(),
        payment_tx("tx1", TransactionStatus::Completed, TransactionType::Payment),
    );
    state
}

fn engine_with(state: LedgerState) -> ReversalEngine<MemoryLedger> {
    ReversalEngine::new(MemoryLedger::from_state(state))
}

#[test]
fn scenario_a_successful_reversal() {
    let engine = engine_with(scenario_state(money(50_000)));

    engine.reverse("tx1", "admin@x").unwrap();

    let state = engine.store().snapshot();
    assert_eq!(state.consumers["u1"].main_balance, money(10_000));
    assert_eq!(state.merchants["m1"].balance, money(40_500));
    assert_eq!(state.transactions["tx1"].status, TransactionStatus::Refunded);

    let tickets: Vec<_> = state
        .transactions
        .values()
        .filter(|tx| tx.tx_type == TransactionType::RefundTicket)
        .collect();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].amount, money(10_000));
    assert_eq!(tickets[0].net_amount, Some(money(9_500)));
}

#[test]
fn scenario_b_insufficient_merchant_funds_changes_nothing() {
    let engine = engine_with(scenario_state(money(5_000)));
    let before = engine.store().snapshot();

    let err = engine.reverse("tx1", "admin@x").unwrap_err();
    assert_eq!(
        err,
        ReversalError::insufficient_funds("m1", money(5_000), money(9_500))
    );
    assert_eq!(engine.store().snapshot(), before);
}

#[rstest]
#[case::scenario_c_pending(TransactionStatus::Pending, "PENDING")]
#[case::scenario_d_already_refunded(TransactionStatus::Refunded, "REFUNDED")]
#[case::failed(TransactionStatus::Failed, "FAILED")]
fn non_completed_statuses_are_invalid_state(
    #[case] status: TransactionStatus,
    #[case] label: &str,
) {
    let mut state = scenario_state(money(50_000));
    state
        .transactions
        .insert("tx1".to_string(), payment_tx("tx1", status, TransactionType::Payment));
    let engine = engine_with(state);
    let before = engine.store().snapshot();

    let err = engine.reverse("tx1", "admin@x").unwrap_err();
    assert!(matches!(err, ReversalError::InvalidState { .. }));
    // The operator-facing message names the actual current status.
    assert!(err.to_string().contains(label));
    assert_eq!(engine.store().snapshot(), before);
}

#[rstest]
#[case::scenario_e_deposit(TransactionType::Deposit)]
#[case::audit_tickets_never_reversible(TransactionType::RefundTicket)]
fn non_payment_types_are_invalid_type(#[case] tx_type: TransactionType) {
    let mut state = scenario_state(money(50_000));
    state
        .transactions
        .insert("tx1".to_string(), payment_tx("tx1", TransactionStatus::Completed, tx_type));
    let engine = engine_with(state);
    let before = engine.store().snapshot();

    let err = engine.reverse("tx1", "admin@x").unwrap_err();
    assert_eq!(err, ReversalError::invalid_type("tx1", tx_type));
    assert_eq!(engine.store().snapshot(), before);
}

#[test]
fn empty_operator_identity_is_unauthorized() {
    let engine = engine_with(scenario_state(money(50_000)));
    assert_eq!(engine.reverse("tx1", ""), Err(ReversalError::Unauthorized));
}

#[test]
fn unknown_transaction_id_is_not_found() {
    let engine = engine_with(scenario_state(money(50_000)));
    assert_eq!(
        engine.reverse("missing", "admin@x"),
        Err(ReversalError::not_found("missing"))
    );
}

#[test]
fn missing_sender_is_missing_consumer_party() {
    let mut state = scenario_state(money(50_000));
    state.transactions.get_mut("tx1").unwrap().sender_id = None;
    let engine = engine_with(state);

    let err = engine.reverse("tx1", "admin@x").unwrap_err();
    assert!(err.to_string().contains("Consumer (Sender)"));
}

#[test]
fn missing_receiver_and_merchant_is_missing_merchant_party() {
    let mut state = scenario_state(money(50_000));
    let tx = state.transactions.get_mut("tx1").unwrap();
    tx.receiver_id = None;
    tx.merchant_id = None;
    let engine = engine_with(state);

    let err = engine.reverse("tx1", "admin@x").unwrap_err();
    assert!(err.to_string().contains("Merchant (Receiver)"));
}

#[test]
fn legacy_merchant_id_field_resolves_the_merchant() {
    let mut state = scenario_state(money(50_000));
    let tx = state.transactions.get_mut("tx1").unwrap();
    tx.receiver_id = None;
    tx.merchant_id = Some("m1".to_string());
    let engine = engine_with(state);

    engine.reverse("tx1", "admin@x").unwrap();
    assert_eq!(
        engine.store().snapshot().merchants["m1"].balance,
        money(40_500)
    );
}

#[test]
fn absent_consumer_wallet_is_account_not_found() {
    let mut state = scenario_state(money(50_000));
    state.consumers.clear();
    let engine = engine_with(state);

    let err = engine.reverse("tx1", "admin@x").unwrap_err();
    assert!(err.to_string().contains("Consumer wallet u1 not found"));
}

#[test]
fn absent_merchant_account_is_account_not_found() {
    let mut state = scenario_state(money(50_000));
    state.merchants.clear();
    let engine = engine_with(state);

    let err = engine.reverse("tx1", "admin@x").unwrap_err();
    assert!(err.to_string().contains("Merchant account m1 not found"));
}

#[test]
fn idempotence_under_retry() {
    let engine = engine_with(scenario_state(money(50_000)));

    engine.reverse("tx1", "admin@x").unwrap();
    let err = engine.reverse("tx1", "admin@x").unwrap_err();
    assert_eq!(
        err,
        ReversalError::invalid_state("tx1", TransactionStatus::Refunded)
    );

    // Exactly one application of the funds movement and one ticket.
    let state = engine.store().snapshot();
    assert_eq!(state.consumers["u1"].main_balance, money(10_000));
    assert_eq!(state.merchants["m1"].balance, money(40_500));
    let tickets = state
        .transactions
        .values()
        .filter(|tx| tx.tx_type == TransactionType::RefundTicket)
        .count();
    assert_eq!(tickets, 1);
}

#[test]
fn atomicity_under_injected_commit_failure() {
    let store = MemoryLedger::from_state(scenario_state(money(50_000)));
    let before = store.snapshot();
    store.fail_next_commit();
    let engine = ReversalEngine::new(store);

    // Preconditions all pass; the commit dies.
    let err = engine.reverse("tx1", "admin@x").unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(engine.store().snapshot(), before);

    // Caller-initiated retry with the same arguments re-evaluates the
    // preconditions on fresh state and succeeds.
    engine.reverse("tx1", "admin@x").unwrap();
    assert_eq!(
        engine.store().snapshot().transactions["tx1"].status,
        TransactionStatus::Refunded
    );
}

#[test]
fn conservation_is_decimal_exact() {
    let engine = engine_with(scenario_state(money(50_000)));
    let before = engine.store().snapshot();

    engine.reverse("tx1", "admin@x").unwrap();

    let after = engine.store().snapshot();
    let consumer_delta =
        after.consumers["u1"].main_balance - before.consumers["u1"].main_balance;
    let merchant_delta = before.merchants["m1"].balance - after.merchants["m1"].balance;
    assert_eq!(consumer_delta, before.transactions["tx1"].amount);
    assert_eq!(
        merchant_delta,
        before.transactions["tx1"].settlement_amount()
    );
}

#[test]
fn audit_ticket_is_complete_and_swaps_parties() {
    let engine = engine_with(scenario_state(money(50_000)));

    engine.reverse("tx1", "admin@x").unwrap();

    let state = engine.store().snapshot();
    let tickets: Vec<_> = state
        .transactions
        .values()
        .filter(|tx| tx.tx_type == TransactionType::RefundTicket)
        .collect();
    assert_eq!(tickets.len(), 1);

    let ticket = tickets[0];
    assert_eq!(ticket.original_tx_id.as_deref(), Some("tx1"));
    assert_eq!(ticket.sender_id.as_deref(), Some("m1"));
    assert_eq!(ticket.receiver_id.as_deref(), Some("u1"));
    assert_eq!(ticket.executed_by.as_deref(), Some("admin@x"));
    assert_eq!(ticket.status, TransactionStatus::Completed);
    assert_eq!(ticket.amount, money(10_000));
    assert_eq!(ticket.net_amount, Some(money(9_500)));

    // The original record carries the accountability fields exactly once.
    let original = &state.transactions["tx1"];
    assert_eq!(original.refunded_by.as_deref(), Some("admin@x"));
    assert!(original.refunded_at.is_some());
}

#[test]
fn net_amount_defaults_to_gross_when_absent() {
    let mut state = scenario_state(money(50_000));
    state.transactions.get_mut("tx1").unwrap().net_amount = None;
    let engine = engine_with(state);

    engine.reverse("tx1", "admin@x").unwrap();

    let after = engine.store().snapshot();
    assert_eq!(after.consumers["u1"].main_balance, money(10_000));
    assert_eq!(after.merchants["m1"].balance, money(40_000));
}

#[test]
fn concurrent_reversals_of_one_payment_linearize() {
    let store = Arc::new(MemoryLedger::from_state(scenario_state(money(50_000))));
    let engine = Arc::new(ReversalEngine::new(Arc::clone(&store)));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || engine.reverse("tx1", "admin@x"))
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.join().unwrap() {
            Ok(()) => successes += 1,
            Err(ReversalError::InvalidState { status, .. }) => {
                assert_eq!(status, TransactionStatus::Refunded)
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(successes, 1);

    let state = store.snapshot();
    assert_eq!(state.consumers["u1"].main_balance, money(10_000));
    assert_eq!(state.merchants["m1"].balance, money(40_500));
    let tickets = state
        .transactions
        .values()
        .filter(|tx| tx.tx_type == TransactionType::RefundTicket)
        .count();
    assert_eq!(tickets, 1);
}
