use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::project::detect::ProjectState;
use crate::project::migrate::MigrationReport;
use crate::project::package_manager::ResolvedPackageManager;
use crate::project::requirements::ParseWarning;
use crate::project::runner::InstallPlan;
use crate::project::tool_config::{ToolName, WriteOutcome};

/// Everything a single `init` run detected, decided and changed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct InitResult {
    pub directory: PathBuf,
    pub state: ProjectState,
    /// `None` when the user had to choose and did not.
    pub package_manager: Option<ResolvedPackageManager>,
    /// Whether resolution needed the interactive prompt.
    pub needed_user_choice: bool,
    pub migrations: Vec<MigrationReport>,
    pub tool_configs: Vec<ToolConfigOutcome>,
    /// Whether `pyproject.toml` did not exist before this run.
    pub manifest_created: bool,
    pub manifest_written: bool,
    /// Development tools still missing from the dev dependencies.
    pub install_plan: Option<InstallPlan>,
    pub warnings: Vec<Warning>,
}

impl InitResult {
    pub(crate) fn new(directory: PathBuf, state: ProjectState) -> Self {
        Self {
            directory,
            state,
            package_manager: None,
            needed_user_choice: false,
            migrations: Vec::new(),
            tool_configs: Vec::new(),
            manifest_created: false,
            manifest_written: false,
            install_plan: None,
            warnings: Vec::new(),
        }
    }

    /// Total number of records added to the manifest.
    pub fn migrated_count(&self) -> usize {
        self.migrations.iter().map(|report| report.added.len()).sum()
    }

    /// The type checker configured for the project, if the run got that far.
    pub fn type_checker(&self) -> Option<ToolName> {
        self.tool_configs
            .iter()
            .map(|config| config.tool)
            .find(|tool| tool.is_type_checker())
    }

    /// Tools whose default configuration was written.
    pub fn tools_written(&self) -> impl Iterator<Item = ToolName> + '_ {
        self.tool_configs
            .iter()
            .filter(|config| config.outcome.was_written())
            .map(|config| config.tool)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct ToolConfigOutcome {
    pub tool: ToolName,
    pub outcome: WriteOutcome,
}

/// A non-fatal problem recorded during `init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Warning {
    /// A requirements line could not be migrated.
    Requirement(ParseWarning),
    /// The existing manifest is not valid TOML and was left untouched.
    InvalidManifest { path: PathBuf, message: String },
    /// A requirements file could not be decoded and was skipped.
    UnreadableRequirements { path: PathBuf, message: String },
    /// A dependency section in the manifest has an unexpected type.
    DependencySection { message: String },
    /// The package manager prompt was not answered.
    NoSelection { message: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requirement(warning) => write!(f, "{warning}"),
            Self::InvalidManifest { path, message } => write!(
                f,
                "`{}` is not valid TOML and was left untouched: {message}",
                path.display()
            ),
            Self::UnreadableRequirements { path, message } => {
                write!(f, "skipped `{}`: {message}", path.display())
            }
            Self::DependencySection { message } | Self::NoSelection { message } => {
                f.write_str(message)
            }
        }
    }
}
