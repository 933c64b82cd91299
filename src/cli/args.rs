use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Inspect a ledger snapshot and reverse completed payments
#[derive(Parser, Debug)]
#[command(name = "ledger-admin")]
#[command(about = "Inspect a ledger snapshot and reverse completed payments", long_about = None)]
pub struct CliArgs {
    /// Directory holding consumers.csv, merchants.csv, transactions.csv
    #[arg(
        long = "ledger",
        value_name = "DIR",
        help = "Path to the ledger snapshot directory"
    )]
    pub ledger_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Admin operations over the ledger snapshot
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print transactions (newest first) and account balances
    List,

    /// Reverse a completed payment and persist the mutated snapshot
    Reverse {
        /// Id of the payment transaction to reverse
        #[arg(value_name = "TX_ID")]
        transaction_id: String,

        /// Operator identity recorded on the reversal for accountability
        #[arg(long, value_name = "IDENTITY")]
        operator: String,

        /// Engine flavor to run the reversal with
        #[arg(long, value_enum, default_value = "sync")]
        strategy: StrategyType,
    },
}

/// Available engine flavors
#[derive(Clone, Debug, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}
