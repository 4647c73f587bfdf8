use std::fmt;
use std::io;
use std::path::Path;
use std::process::Command;

use serde::Serialize;
use tracing::debug;

use crate::project::package_manager::PackageManagerKind;
use crate::project::tool_config::ToolName;

/// The command that installs the development tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallPlan {
    pub program: String,
    pub args: Vec<String>,
    pub packages: Vec<String>,
}

impl InstallPlan {
    /// The plan for installing `tools` with `kind`, or `None` if there is nothing to install.
    pub fn for_kind(kind: PackageManagerKind, tools: &[ToolName]) -> Option<Self> {
        Self::for_packages(kind, tools.iter().map(ToString::to_string).collect())
    }

    /// The plan for adding arbitrary development `packages` with `kind`.
    pub fn for_packages(kind: PackageManagerKind, packages: Vec<String>) -> Option<Self> {
        if packages.is_empty() {
            return None;
        }
        let (program, args): (&str, &[&str]) = match kind {
            PackageManagerKind::Uv => ("uv", &["add", "--dev"]),
            PackageManagerKind::Poetry => ("poetry", &["add", "--group", "dev"]),
            PackageManagerKind::Pdm => ("pdm", &["add", "-dG", "dev"]),
            PackageManagerKind::Pip | PackageManagerKind::Unknown => ("pip", &["install"]),
        };
        Some(Self {
            program: program.to_owned(),
            args: args.iter().map(ToString::to_string).collect(),
            packages,
        })
    }

    /// Add `package` unless the plan already installs it.
    pub fn push(&mut self, package: &str) {
        if !self.packages.iter().any(|existing| existing == package) {
            self.packages.push(package.to_owned());
        }
    }
}

impl fmt::Display for InstallPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in self.args.iter().chain(&self.packages) {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// The exit status of an external command.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub exit_code: u8,
}

impl RunOutcome {
    pub fn success(self) -> bool {
        self.exit_code == 0
    }
}

/// Executes an [`InstallPlan`].
pub trait ToolRunner {
    fn run(&self, plan: &InstallPlan, directory: &Path) -> io::Result<RunOutcome>;
}

/// Runs the plan as a child process that inherits the standard streams.
#[derive(Debug, Default, Copy, Clone)]
pub struct ProcessToolRunner;

impl ToolRunner for ProcessToolRunner {
    fn run(&self, plan: &InstallPlan, directory: &Path) -> io::Result<RunOutcome> {
        debug!("Running `{plan}` in `{}`", directory.display());
        let status = Command::new(&plan.program)
            .args(&plan.args)
            .args(&plan.packages)
            .current_dir(directory)
            .status()?;

        // Signals have no code; report them as a generic failure.
        let exit_code = status
            .code()
            .map_or(1, |code| u8::try_from(code).unwrap_or(1));
        Ok(RunOutcome { exit_code })
    }
}
