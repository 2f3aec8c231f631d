//! # quire CLI
//!
//! This is the binary entry point for the `quire` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Handling top-level application errors and translating them into user-friendly
//!   output and an exit status (130 when interrupted with Ctrl-C).
//!
//! The render pipeline itself lives in the `quire` library crate; the binary
//! is a thin wrapper around it.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {:?}", error);
            let cancelled = matches!(
                error.downcast_ref::<quire::Error>(),
                Some(quire::Error::Cancelled)
            );
            if cancelled {
                ExitCode::from(commands::EXIT_INTERRUPTED)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
