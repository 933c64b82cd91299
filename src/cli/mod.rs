//! CLI arguments parsing
//!
//! # Components
//!
//! - `args` - clap definitions for the `ledger-admin` binary

pub mod args;

pub use args::{CliArgs, Command, StrategyType};

use clap::Parser;

/// Parse command-line arguments, exiting with usage help on error
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
