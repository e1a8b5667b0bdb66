//! Spyglass CLI - replay header and timeline tool
//!
//! # Commands
//!
//! - `spyglass decode` - Decode replay headers (many files in parallel)
//! - `spyglass reconcile` - Assemble a recorded fragment dump and validate it
//! - `spyglass config` - Show the effective configuration
//!
//! # Usage
//!
//! ```bash
//! # Summarize every replay in a folder
//! spyglass decode replays/*.replay
//!
//! # Check a classifier dump against its replay
//! spyglass reconcile match.replay match.fragments.json --json
//! ```
//!
//! Logging goes to stderr and follows `RUST_LOG` (default `info`).

mod config;
mod decode;
mod reconcile;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Spyglass CLI - replay header and timeline tool
#[derive(Parser)]
#[command(name = "spyglass")]
#[command(about = "Decode replay headers and check reconstructed timelines")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode replay headers and print one line per file
    Decode(decode::DecodeArgs),

    /// Assemble recorded fragments for one replay and validate the result
    Reconcile(reconcile::ReconcileArgs),

    /// Print the effective configuration and where it is read from
    Config(config::ConfigArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Decode(args) => decode::execute(args),
        Commands::Reconcile(args) => reconcile::execute(args),
        Commands::Config(args) => config::execute(args),
    }
}
