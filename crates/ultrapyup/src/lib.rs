//! ultrapyup: initialize Python projects.
//!
//! This crate provides the main entry point and command dispatch for the
//! ultrapyup binary. It parses CLI arguments, sets up logging, and delegates to
//! command handlers built on the [`project`] and [`setup`] modules.

#![deny(clippy::print_stdout, clippy::print_stderr)]

use std::ffi::OsString;
use std::io::IsTerminal;
use std::process::ExitCode;

use anstream::eprintln;
use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::commands::ExitStatus;
use crate::printer::Printer;

pub mod cli;
pub mod commands;
pub mod printer;
pub mod project;
pub mod setup;

/// Entry point for the ultrapyup CLI.
pub fn main<I, T>(args: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => err.exit(),
    };

    setup_logging(cli.verbose, cli.quiet);
    let printer = Printer::new(cli.quiet);

    match commands::dispatch(cli.command, printer) {
        Ok(code) => code.into(),
        Err(err) => {
            let mut causes = err.chain();
            if let Some(first) = causes.next() {
                printer.error(&first.to_string());
            }
            for cause in causes {
                eprintln!(
                    "  {}: {}",
                    "Caused by".red().bold(),
                    cause.to_string().trim()
                );
            }
            ExitStatus::Error.into()
        }
    }
}

/// Send `tracing` diagnostics to stderr.
///
/// `-v` enables debug output for ultrapyup, `-vv` enables trace output;
/// `RUST_LOG` takes precedence when set.
fn setup_logging(verbosity: u8, quiet: bool) {
    let level = match (quiet, verbosity) {
        (true, _) => "ultrapyup=off",
        (false, 0) => "ultrapyup=warn",
        (false, 1) => "ultrapyup=debug",
        (false, _) => "ultrapyup=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .try_init();
}
