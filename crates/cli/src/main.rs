//! Tidewater CLI - operational tools for the pricing and settlement engine.
//!
//! # Usage
//!
//! ```bash
//! # Validate the two rate sources and the cache
//! tw-cli rates check
//!
//! # Exact calculator price for a 10x10 panel
//! tw-cli quote --height 10 --width 10 --material "#36 Nylon" --border "Sewn Rope"
//!
//! # Marketing estimate range for a 20x10x10 enclosure
//! tw-cli quote --height 10 --width 10 --length 20 --shape panel --estimate \
//!     --material "#36 Nylon" --border "Sewn Rope"
//!
//! # Monthly payout report (the scheduled reporting job)
//! tw-cli payout-report --start 2026-07-01 --end 2026-07-31 --out payout-2026-07.json
//! ```
//!
//! # Commands
//!
//! - `rates check` - Load both rate sources and report what was parsed
//! - `quote` - Price a panel or cage from dimensions
//! - `payout-report` - Reconcile paid orders over a date window

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod store;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "tw-cli")]
#[command(author, version, about = "Tidewater Netting CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the rate sources
    Rates {
        #[command(subcommand)]
        action: RatesAction,
    },
    /// Price a panel or cage from dimensions
    Quote(commands::quote::QuoteArgs),
    /// Build the payout reconciliation report for a date window
    PayoutReport {
        /// First day of the window (inclusive, UTC), e.g. 2026-07-01
        #[arg(long)]
        start: NaiveDate,

        /// Last day of the window (inclusive, UTC), e.g. 2026-07-31
        #[arg(long)]
        end: NaiveDate,

        /// Where to write the structured report JSON
        #[arg(long, default_value = "payout-report.json")]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum RatesAction {
    /// Load both rate sources and report what was parsed
    Check,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::from_env()?;

    match cli.command {
        Commands::Rates { action } => match action {
            RatesAction::Check => commands::rates::check(&config)?,
        },
        Commands::Quote(args) => commands::quote::run(&config, &args)?,
        Commands::PayoutReport { start, end, out } => {
            commands::payout::run(&config, start, end, &out).await?;
        }
    }
    Ok(())
}
