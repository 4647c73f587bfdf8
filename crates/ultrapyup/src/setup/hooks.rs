//! Git hook managers that run the development tools before each commit.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::project::InstallPlan;
use crate::setup::{GeneratedFile, ProjectTools, write_new};

const HEADER: &str = "# Generated by ultrapyup; edit freely.\n";

/// A git hook manager.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, clap::ValueEnum)]
pub enum HookTool {
    Lefthook,
    PreCommit,
}

impl HookTool {
    pub const ALL: [Self; 2] = [Self::Lefthook, Self::PreCommit];

    /// The tool's name, which is also its Python package.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lefthook => "lefthook",
            Self::PreCommit => "pre-commit",
        }
    }

    /// The name shown in the selection menu.
    pub fn label(self) -> &'static str {
        match self {
            Self::Lefthook => "Lefthook",
            Self::PreCommit => "Pre-commit",
        }
    }

    pub fn config_file(self) -> &'static str {
        match self {
            Self::Lefthook => "lefthook.yaml",
            Self::PreCommit => ".pre-commit-config.yaml",
        }
    }

    /// The configuration file content.
    pub fn config(self, tools: ProjectTools) -> Result<String, serde_yaml::Error> {
        let hooks = Hook::all(tools);
        let yaml = match self {
            Self::Lefthook => serde_yaml::to_string(&Lefthook::new(&hooks))?,
            Self::PreCommit => serde_yaml::to_string(&PreCommitConfig::new(&hooks))?,
        };
        Ok(format!("{HEADER}{yaml}"))
    }

    /// The command that registers the hook with git, once the tool is installed.
    pub fn activation(self, tools: ProjectTools) -> InstallPlan {
        let command = tools.run(&format!("{self} install"));
        let mut words = command.split_whitespace().map(str::to_owned);
        InstallPlan {
            program: words.next().unwrap_or_default(),
            args: words.collect(),
            packages: Vec::new(),
        }
    }
}

impl fmt::Display for HookTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write the configuration file of every tool in `hook_tools` into `directory`.
pub fn write_configs(
    directory: &Path,
    hook_tools: &[HookTool],
    tools: ProjectTools,
) -> Result<Vec<GeneratedFile>> {
    let mut files = Vec::new();
    for tool in hook_tools {
        let content = tool.config(tools)?;
        files.push(write_new(directory, tool.config_file(), &content)?);
    }
    Ok(files)
}

/// One check run before each commit.
struct Hook {
    id: &'static str,
    name: &'static str,
    command: String,
    /// Rewrites files, which must then be staged again.
    fixes: bool,
    /// Takes the staged Python files as arguments.
    per_file: bool,
}

impl Hook {
    fn all(tools: ProjectTools) -> [Self; 3] {
        [
            Self {
                id: "ruff-check",
                name: "ruff check",
                command: tools.lint(),
                fixes: true,
                per_file: true,
            },
            Self {
                id: "ruff-format",
                name: "ruff format",
                command: tools.format(),
                fixes: true,
                per_file: true,
            },
            Self {
                id: "type-check",
                name: tools.type_checker.as_str(),
                command: tools.type_check(),
                fixes: false,
                per_file: false,
            },
        ]
    }
}

#[derive(Serialize)]
struct Lefthook {
    #[serde(rename = "pre-commit")]
    pre_commit: LefthookHook,
}

#[derive(Serialize)]
struct LefthookHook {
    commands: BTreeMap<&'static str, LefthookCommand>,
}

#[derive(Serialize)]
struct LefthookCommand {
    glob: &'static str,
    run: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stage_fixed: bool,
}

impl Lefthook {
    fn new(hooks: &[Hook]) -> Self {
        let commands = hooks
            .iter()
            .map(|hook| {
                let run = if hook.per_file {
                    format!("{} {{staged_files}}", hook.command)
                } else {
                    hook.command.clone()
                };
                let command = LefthookCommand {
                    glob: "*.py",
                    run,
                    stage_fixed: hook.fixes,
                };
                (hook.id, command)
            })
            .collect();
        Self {
            pre_commit: LefthookHook { commands },
        }
    }
}

#[derive(Serialize)]
struct PreCommitConfig {
    repos: Vec<PreCommitRepo>,
}

#[derive(Serialize)]
struct PreCommitRepo {
    repo: &'static str,
    hooks: Vec<PreCommitHook>,
}

#[derive(Serialize)]
struct PreCommitHook {
    id: &'static str,
    name: &'static str,
    entry: String,
    language: &'static str,
    types: [&'static str; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    pass_filenames: Option<bool>,
}

impl PreCommitConfig {
    fn new(hooks: &[Hook]) -> Self {
        let hooks = hooks
            .iter()
            .map(|hook| PreCommitHook {
                id: hook.id,
                name: hook.name,
                entry: hook.command.clone(),
                language: "system",
                types: ["python"],
                pass_filenames: (!hook.per_file).then_some(false),
            })
            .collect();
        Self {
            repos: vec![PreCommitRepo {
                repo: "local",
                hooks,
            }],
        }
    }
}
