//! Project extras written by `ultrapyup init` after the manifest is settled:
//! coding-assistant rule files and git hook configuration.
//!
//! These never touch `pyproject.toml`. Files that already exist are kept.

use std::io::{self, Write as _};
use std::path::{Path, PathBuf};

use console::Term;
use dialoguer::MultiSelect;
use serde::Serialize;
use tracing::debug;

use crate::project::{PackageManagerKind, ToolName};

pub mod editor;
pub mod hooks;

pub use editor::Editor;
pub use hooks::HookTool;

/// What happened to a generated file.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileOutcome {
    Created,
    /// A file was already there and was left as is.
    Kept,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    /// Relative to the project directory.
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

/// The project facts generated files refer to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ProjectTools {
    pub kind: PackageManagerKind,
    pub type_checker: ToolName,
}

impl ProjectTools {
    pub fn new(kind: PackageManagerKind, type_checker: ToolName) -> Self {
        Self { kind, type_checker }
    }

    /// `command` as run inside the project's environment.
    pub fn run(self, command: &str) -> String {
        match self.kind {
            PackageManagerKind::Uv => format!("uv run {command}"),
            PackageManagerKind::Poetry => format!("poetry run {command}"),
            PackageManagerKind::Pdm => format!("pdm run {command}"),
            PackageManagerKind::Pip | PackageManagerKind::Unknown => command.to_owned(),
        }
    }

    pub fn lint(self) -> String {
        self.run("ruff check --fix")
    }

    pub fn format(self) -> String {
        self.run("ruff format")
    }

    pub fn type_check(self) -> String {
        if self.type_checker == ToolName::Ty {
            self.run("ty check")
        } else {
            self.run("mypy .")
        }
    }

    pub fn test(self) -> String {
        self.run("pytest")
    }
}

/// Ask which of `choices` to enable.
///
/// Nothing is selected when stderr is not a terminal or the user skips.
pub fn choose<T: Copy>(term: &Term, prompt: &str, choices: &[(T, &str)]) -> io::Result<Vec<T>> {
    if choices.is_empty() || !term.is_term() {
        return Ok(Vec::new());
    }

    let labels: Vec<&str> = choices.iter().map(|(_, label)| *label).collect();
    let picked = MultiSelect::new()
        .with_prompt(prompt)
        .items(&labels)
        .interact_on_opt(term)
        .map_err(io::Error::other)?;
    Ok(picked
        .unwrap_or_default()
        .into_iter()
        .filter_map(|index| choices.get(index).map(|(choice, _)| *choice))
        .collect())
}

/// Create `directory/relative` holding `content`, keeping any file already there.
fn write_new(directory: &Path, relative: &str, content: &str) -> io::Result<GeneratedFile> {
    let path = directory.join(relative);
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }

    let created = fs_err::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path);
    let outcome = match created {
        Ok(mut file) => {
            file.write_all(content.as_bytes())?;
            debug!("Created `{}`", path.display());
            FileOutcome::Created
        }
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            debug!("Keeping existing `{}`", path.display());
            FileOutcome::Kept
        }
        Err(err) => return Err(err),
    };
    Ok(GeneratedFile {
        path: PathBuf::from(relative),
        outcome,
    })
}
