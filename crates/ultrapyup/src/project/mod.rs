//! Python project detection and initialization.
//!
//! ## Architecture
//!
//! The central type is [`InitOrchestrator`], which runs:
//!
//! - [`detect::detect`]: classify the directory as a [`ProjectState`]
//! - [`package_manager::resolve`]: lockfile -> manifest table -> `requirements.txt`
//!   -> host executable, or ask the [`InteractivePrompt`]
//! - [`migrate::migrate`]: `requirements*.txt` -> `[project.dependencies]` or the
//!   manager's dev section
//! - [`tool_config::ensure`]: default `[tool.ruff]`, `[tool.ty]`/`[tool.mypy]` and
//!   `[tool.pytest]`, only where absent
//!
//! Installing the tools is left to the caller through a [`ToolRunner`].

pub mod detect;
mod error;
pub mod init;
pub mod manifest;
pub mod migrate;
pub mod package_manager;
mod probe;
pub mod prompt;
pub mod requirements;
mod result;
pub mod runner;
pub mod tool_config;

pub use detect::ProjectState;
pub use error::{DetectionError, InitError};
pub use init::{InitOrchestrator, Reporter};
pub use package_manager::{
    HostTools, PackageManagerKind, PathHostTools, Provenance, Resolution, ResolvedPackageManager,
};
pub use prompt::{InteractivePrompt, TerminalPrompt};
pub use result::{InitResult, ToolConfigOutcome, Warning};
pub use runner::{InstallPlan, ProcessToolRunner, RunOutcome, ToolRunner};
pub use tool_config::{ToolDefaults, ToolName};
