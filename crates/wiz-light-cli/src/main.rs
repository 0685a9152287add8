//! WiZ Light CLI - Command-line control for WiZ smart lights.
//!
//! Talks the WiZ UDP/JSON protocol directly, enabling automation via
//! scripts and headless operation.

mod cli;
mod commands;
mod discovery;
mod error;
mod output;
mod types;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::{exit_codes, CliError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

/// Logs go to stderr so JSON output stays parseable.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Discover(args) => commands::run_discover(args, cli.json).await,
        Commands::Pilot(args) => {
            commands::run_pilot(args, cli.timeout, cli.json, cli.strict).await
        }
        Commands::Config(args) => commands::run_config(args, cli.timeout, cli.json).await,
        Commands::Listen(args) => commands::run_listen(args, cli.json).await,
    }
}
