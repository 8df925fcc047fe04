//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `shortlink_gate` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use shortlink_gate::initialization::init_logger_with;
use shortlink_gate::{run_redirect, Config, RedirectOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments into Config
    let config = Config::parse();

    // Initialize logger based on config
    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    // Run the session using the library
    match run_redirect(config).await {
        Ok(report) => match report.outcome {
            RedirectOutcome::Completed { target } => {
                eprintln!(
                    "✅ {} resolved and opened {} in {:.1}s",
                    report.short_code, target, report.elapsed_seconds
                );
                Ok(())
            }
            RedirectOutcome::Cancelled => {
                eprintln!("🚫 {} cancelled, no redirect followed", report.short_code);
                Ok(())
            }
            RedirectOutcome::Failed { message, .. } => {
                eprintln!("❌ {}: {}", report.short_code, message);
                process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("shortlink_gate error: {:#}", e);
            process::exit(1);
        }
    }
}
