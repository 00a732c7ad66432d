//! bb-e2e - black-box test generation harness
//!
//! Runs a test generation engine against a live service, checks the
//! coverage targets it reached, and re-executes the generated suite.

use clap::Parser;

mod commands;

use commands::Cli;

#[tokio::main]
async fn main() {
    bb_e2e_core::logging::init();
    let cli = Cli::parse();

    if let Err(e) = cli.execute().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
