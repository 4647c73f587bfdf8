//! CLI argument definitions for ultrapyup.
//!
//! All clap derive structs live here. The [`Cli`] struct is the top-level
//! parser; [`Commands`] enumerates every subcommand.

use std::path::PathBuf;
use std::str::FromStr;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand, ValueEnum};

use crate::project::PackageManagerKind;
use crate::setup::{Editor, HookTool};

/// Clap v3-style help menu colors.
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// Set up Python projects with a package manager, migrated dependencies and dev tooling.
#[derive(Parser, Debug)]
#[command(
    name = "ultrapyup",
    author,
    version,
    about = "Set up Python projects with a package manager, migrated dependencies and dev tooling.",
    styles = STYLES,
    after_help = "Use `ultrapyup help <command>` for more information on a specific command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase logging verbosity.
    #[arg(global = true, short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors.
    #[arg(global = true, short, long)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a Python project: detect it, migrate requirements and configure tools.
    Init(InitArgs),
}

/// Arguments for `ultrapyup init`.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// The project directory.
    #[arg(long, short = 'C', default_value = ".")]
    pub directory: PathBuf,

    /// Use this package manager instead of detecting one.
    ///
    /// One of `uv`, `pip`, `poetry` or `pdm`.
    #[arg(
        long,
        value_parser = PackageManagerKind::from_str,
        env = "ULTRAPYUP_PACKAGE_MANAGER"
    )]
    pub package_manager: Option<PackageManagerKind>,

    /// Do not install the development tools after configuring them.
    #[arg(
        long,
        env = "ULTRAPYUP_NO_INSTALL",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub no_install: bool,

    /// Write coding-assistant rules for this editor. May be repeated.
    ///
    /// Without `--editor` or `--pre-commit`, an interactive terminal is asked which to set up.
    #[arg(long, value_enum, value_name = "EDITOR")]
    pub editor: Vec<Editor>,

    /// Configure this git hook manager to run the development tools. May be repeated.
    #[arg(long, value_enum, value_name = "TOOL")]
    pub pre_commit: Vec<HookTool>,

    /// A TOML file whose top-level tables override the default tool configuration.
    ///
    /// Tables are keyed by tool name: `ruff`, `ty`, `mypy` and `pytest`.
    #[arg(long, value_name = "FILE")]
    pub tool_defaults: Option<PathBuf>,

    /// The format of the final report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary on stderr.
    Text,
    /// The full result as JSON on stdout.
    Json,
}
