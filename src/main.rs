//! # Courier CLI
//!
//! This is the binary entry point for the `courier` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Installing the logger and the interrupt listener.
//! - Reporting a failed run on stderr and exiting with status 1.
//!
//! The vendoring logic lives in the `courier` library crate; the binary is a
//! thin wrapper around it.

mod cli;
mod signal;

use clap::Parser;

fn main() {
    let cli = cli::Cli::parse();
    if let Err(e) = cli.execute() {
        log::error!("{:#}", e);
        // the logger is silent when RUST_LOG filters out errors
        if !log::log_enabled!(log::Level::Error) {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}
