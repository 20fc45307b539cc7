//! # hhsim - Hodgkin-Huxley simulator CLI
//!
//! Runs HH neuron experiments described in TOML and prints the membrane
//! potential of every neuron as CSV.

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hhsim_cli::HhsimCli;

fn main() {
    // Parse CLI arguments
    let cli = HhsimCli::parse();

    // Initialize logging with environment variable support; stdout is
    // reserved for CSV output
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Execute the command
    if let Err(err) = cli.execute() {
        error!("Command failed: {}", err);
        std::process::exit(1);
    }
}
