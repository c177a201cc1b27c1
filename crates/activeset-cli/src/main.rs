//! activeset command-line front end
//!
//! Solves a QP from a JSON problem file (or a built-in scenario, by default
//! the reference example) and prints a JSON report on stdout.

mod cli;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli::run(&cli) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    }
}
