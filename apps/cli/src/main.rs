//! # b2b-cart Entry Point
//!
//! Parses arguments, initializes logging and dispatches to
//! [`b2b_cart_cli::run`].

use std::path::PathBuf;

use b2b_cart_cli::Commands;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// B2B cart rules: run the business-customer rule pipeline over JSON carts.
#[derive(Parser, Debug)]
#[command(name = "b2b-cart", version, about)]
struct Cli {
    /// Rule configuration file (defaults to the platform config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let output = b2b_cart_cli::run(cli.command, cli.config)?;
    println!("{}", output);

    Ok(())
}

/// Initializes the tracing subscriber for structured logging on stderr.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show every rule decision
/// - `RUST_LOG=b2b_cart_core=trace` - Also show skipped rules
/// - Default: `info,b2b_cart_core=debug`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,b2b_cart_core=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
