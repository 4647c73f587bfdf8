//! Output formatting for ultrapyup commands.
//!
//! The [`Printer`] controls whether messages are emitted to stderr based on
//! the user's `--quiet` flag. Errors are always printed regardless of quiet
//! mode. Diagnostics go through `tracing` instead.

use anstream::eprintln;
use owo_colors::OwoColorize;

use crate::project::Reporter;

/// Controls output formatting for ultrapyup commands.
#[derive(Copy, Clone, Debug)]
pub struct Printer {
    /// Whether output is suppressed.
    quiet: bool,
}

impl Printer {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Print an informational message to stderr.
    pub fn info(&self, message: &str) {
        if !self.quiet {
            eprintln!("{message}");
        }
    }

    /// Print a success message to stderr.
    pub fn success(&self, message: &str) {
        if !self.quiet {
            eprintln!("{}", message.green().bold());
        }
    }

    /// Print a warning message to stderr.
    pub fn warn(&self, message: &str) {
        if !self.quiet {
            eprintln!("{}: {}", "warning".yellow().bold(), message);
        }
    }

    /// Print an error message to stderr, even in quiet mode.
    pub fn error(&self, message: &str) {
        eprintln!("{}: {}", "error".red().bold(), message);
    }
}

impl Reporter for Printer {
    fn info(&self, message: &str) {
        Self::info(self, message);
    }

    fn warn(&self, message: &str) {
        Self::warn(self, message);
    }
}
