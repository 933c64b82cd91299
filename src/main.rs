//! Ledger admin CLI
//!
//! Thin presentation layer over the reversal engine, operating on a CSV
//! snapshot of the ledger.
//!
//! # Usage
//!
//! ```bash
//! ledger-admin --ledger ./snapshot list
//! ledger-admin --ledger ./snapshot reverse tx1 --operator admin@example.com
//! ledger-admin --ledger ./snapshot reverse tx1 --operator admin@example.com --strategy async
//! ```
//!
//! `reverse` loads the snapshot, runs one reversal, and persists the mutated
//! snapshot only on success. The engine's error message is printed verbatim
//! for the operator.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (snapshot missing, reversal rejected, etc.)

use ledger_reversal_engine::cli::{self, Command, StrategyType};
use ledger_reversal_engine::core::{AsyncReversalEngine, ReversalEngine};
use ledger_reversal_engine::io::snapshot;
use ledger_reversal_engine::store::{AsyncMemoryLedger, LedgerState, MemoryLedger};
use std::error::Error;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: cli::CliArgs) -> Result<(), Box<dyn Error>> {
    let state = snapshot::load_ledger(&args.ledger_dir)?;

    match args.command {
        Command::List => {
            print_ledger(&state);
            Ok(())
        }
        Command::Reverse {
            transaction_id,
            operator,
            strategy,
        } => {
            let mutated = match strategy {
                StrategyType::Sync => {
                    let engine = ReversalEngine::new(MemoryLedger::from_state(state));
                    engine.reverse(&transaction_id, &operator)?;
                    engine.store().snapshot()
                }
                StrategyType::Async => {
                    let store = Arc::new(AsyncMemoryLedger::from_state(state));
                    let engine = AsyncReversalEngine::new(Arc::clone(&store));
                    let runtime = tokio::runtime::Runtime::new()?;
                    runtime.block_on(engine.reverse(&transaction_id, &operator))?;
                    runtime.block_on(store.snapshot())
                }
            };

            snapshot::save_ledger(&args.ledger_dir, &mutated)?;
            println!("Refund applied to transaction {transaction_id} by {operator}.");
            Ok(())
        }
    }
}

/// Print transactions newest first, then account balances
fn print_ledger(state: &LedgerState) {
    let mut transactions: Vec<_> = state.transactions.values().collect();
    transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    println!("TRANSACTIONS");
    for tx in transactions {
        let sender = tx.sender_id.as_deref().unwrap_or("-");
        let receiver = tx
            .merchant_party()
            .map(String::as_str)
            .unwrap_or("-");
        println!(
            "  {}  {:13} {:9} {:>12}  {} -> {}",
            tx.id, tx.tx_type, tx.status, tx.amount, sender, receiver
        );
    }

    let mut consumers: Vec<_> = state.consumers.values().collect();
    consumers.sort_by(|a, b| a.id.cmp(&b.id));
    println!("CONSUMER WALLETS");
    for account in consumers {
        println!("  {}  {:>12}", account.id, account.main_balance);
    }

    let mut merchants: Vec<_> = state.merchants.values().collect();
    merchants.sort_by(|a, b| a.id.cmp(&b.id));
    println!("MERCHANT ACCOUNTS");
    for account in merchants {
        println!("  {}  {:>12}", account.id, account.balance);
    }
}
