//! Rule files for coding assistants and editors.

use std::io;
use std::path::Path;

use crate::setup::{GeneratedFile, ProjectTools, write_new};

const RULES: &str = include_str!("../../resources/rules.md");
const ZED_SETTINGS: &str = include_str!("../../resources/zed-settings.json");

/// An editor or assistant that reads project rules.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, clap::ValueEnum)]
pub enum Editor {
    VscodeCopilot,
    Cursor,
    Windsurf,
    Zed,
    Claude,
    Codex,
}

impl Editor {
    pub const ALL: [Self; 6] = [
        Self::VscodeCopilot,
        Self::Cursor,
        Self::Windsurf,
        Self::Zed,
        Self::Claude,
        Self::Codex,
    ];

    /// The name shown in the selection menu.
    pub fn label(self) -> &'static str {
        match self {
            Self::VscodeCopilot => "GitHub Copilot (VSCode)",
            Self::Cursor => "Cursor",
            Self::Windsurf => "Windsurf",
            Self::Zed => "Zed",
            Self::Claude => "Claude Code",
            Self::Codex => "OpenAI Codex",
        }
    }

    /// The files this editor reads, relative to the project root.
    fn files(self, rules: &str) -> Vec<(&'static str, String)> {
        match self {
            Self::VscodeCopilot => vec![(".github/copilot-instructions.md", rules.to_owned())],
            Self::Cursor => vec![(
                ".cursor/rules/ultrapyup.mdc",
                format!(
                    "---\ndescription: Python project conventions\nglobs: \"**/*.py\"\n\
                     alwaysApply: true\n---\n\n{rules}"
                ),
            )],
            Self::Windsurf => vec![(
                ".windsurf/rules/ultrapyup.md",
                format!("---\ntrigger: always_on\n---\n\n{rules}"),
            )],
            Self::Zed => vec![
                (".rules", rules.to_owned()),
                (".zed/settings.json", ZED_SETTINGS.to_owned()),
            ],
            Self::Claude => vec![("CLAUDE.md", rules.to_owned())],
            Self::Codex => vec![("AGENTS.md", rules.to_owned())],
        }
    }
}

/// The shared rules text, spelled with this project's commands.
pub fn rules(tools: ProjectTools) -> String {
    RULES
        .replace("{lint}", &tools.lint())
        .replace("{format}", &tools.format())
        .replace("{type_check}", &tools.type_check())
        .replace("{test}", &tools.test())
}

/// Write the rule files of every editor in `editors` into `directory`.
pub fn write_rules(
    directory: &Path,
    editors: &[Editor],
    tools: ProjectTools,
) -> io::Result<Vec<GeneratedFile>> {
    let rules = rules(tools);
    let mut files = Vec::new();
    for editor in editors {
        for (path, content) in editor.files(&rules) {
            files.push(write_new(directory, path, &content)?);
        }
    }
    Ok(files)
}
