//! Default `[tool.*]` configuration for the development tools.
//!
//! A tool section is only ever written when it is absent (or an empty table).
//! Anything the user already put there is left exactly as it is.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use toml_edit::{ArrayOfTables, DocumentMut, Item, Table};
use tracing::debug;

use crate::project::manifest::Manifest;
use crate::project::package_manager::PackageManagerKind;

/// A development tool with a `[tool.<name>]` section.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolName {
    Ruff,
    Ty,
    Mypy,
    Pytest,
}

impl ToolName {
    pub const ALL: [Self; 4] = [Self::Ruff, Self::Ty, Self::Mypy, Self::Pytest];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ruff => "ruff",
            Self::Ty => "ty",
            Self::Mypy => "mypy",
            Self::Pytest => "pytest",
        }
    }

    /// The type checker configured for projects managed by `kind`.
    pub fn type_checker_for(kind: PackageManagerKind) -> Self {
        if kind == PackageManagerKind::Uv {
            Self::Ty
        } else {
            Self::Mypy
        }
    }

    /// The linter, type checker and test runner for `kind`, in that order.
    pub fn for_kind(kind: PackageManagerKind) -> [Self; 3] {
        [Self::Ruff, Self::type_checker_for(kind), Self::Pytest]
    }

    /// Whether this tool fills the type-checker slot.
    pub fn is_type_checker(self) -> bool {
        matches!(self, Self::Ty | Self::Mypy)
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of [`ensure`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteOutcome {
    /// The defaults were inserted.
    Written,
    /// The manifest already configures the tool; nothing was changed.
    AlreadyConfigured,
}

impl WriteOutcome {
    pub fn was_written(self) -> bool {
        matches!(self, Self::Written)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ToolDefaultsError {
    #[error("failed to read `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    #[error("failed to parse `{}`", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        err: toml_edit::TomlError,
    },

    #[error("`{tool}` in `{}` must be a table", path.display())]
    NotATable { path: PathBuf, tool: String },
}

/// Default configuration for each tool.
#[derive(Debug, Clone)]
pub struct ToolDefaults {
    ruff: Table,
    ty: Table,
    mypy: Table,
    pytest: Table,
}

impl Default for ToolDefaults {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ToolDefaults {
    /// The built-in defaults.
    pub fn builtin() -> Self {
        let mut ruff = Table::new();
        ruff.insert("line-length", toml_edit::value(88));
        let mut lint = Table::new();
        lint.insert(
            "select",
            toml_edit::value(toml_edit::Array::from_iter(["E", "F", "I", "UP", "B"])),
        );
        ruff.insert("lint", Item::Table(lint));

        let mut ty = Table::new();
        ty.set_implicit(true);
        let mut environment = Table::new();
        environment.insert("python", toml_edit::value("./.venv"));
        ty.insert("environment", Item::Table(environment));

        let mut mypy = Table::new();
        mypy.insert("strict", toml_edit::value(true));
        mypy.insert("warn_unused_ignores", toml_edit::value(true));

        let mut pytest = Table::new();
        pytest.set_implicit(true);
        let mut ini_options = Table::new();
        ini_options.insert(
            "testpaths",
            toml_edit::value(toml_edit::Array::from_iter(["tests"])),
        );
        ini_options.insert("addopts", toml_edit::value("-ra"));
        pytest.insert("ini_options", Item::Table(ini_options));

        Self {
            ruff,
            ty,
            mypy,
            pytest,
        }
    }

    /// Built-in defaults overridden by the top-level tables of the TOML file at `path`.
    pub fn from_path(path: &Path) -> Result<Self, ToolDefaultsError> {
        let content = fs_err::read_to_string(path).map_err(|err| ToolDefaultsError::Read {
            path: path.to_path_buf(),
            err,
        })?;
        Self::from_content(&content, path)
    }

    fn from_content(content: &str, path: &Path) -> Result<Self, ToolDefaultsError> {
        let document: DocumentMut = content.parse().map_err(|err| ToolDefaultsError::Parse {
            path: path.to_path_buf(),
            err,
        })?;

        let mut defaults = Self::builtin();
        for tool in ToolName::ALL {
            let Some(item) = document.get(tool.as_str()) else {
                continue;
            };
            let table = match item {
                Item::Table(table) => detach(table),
                Item::Value(toml_edit::Value::InlineTable(inline)) => {
                    detach(&inline.clone().into_table())
                }
                _ => {
                    return Err(ToolDefaultsError::NotATable {
                        path: path.to_path_buf(),
                        tool: tool.to_string(),
                    });
                }
            };
            debug!("Using `{tool}` defaults from `{}`", path.display());
            *defaults.get_mut(tool) = table;
        }
        Ok(defaults)
    }

    pub fn get(&self, tool: ToolName) -> &Table {
        match tool {
            ToolName::Ruff => &self.ruff,
            ToolName::Ty => &self.ty,
            ToolName::Mypy => &self.mypy,
            ToolName::Pytest => &self.pytest,
        }
    }

    fn get_mut(&mut self, tool: ToolName) -> &mut Table {
        match tool {
            ToolName::Ruff => &mut self.ruff,
            ToolName::Ty => &mut self.ty,
            ToolName::Mypy => &mut self.mypy,
            ToolName::Pytest => &mut self.pytest,
        }
    }
}

/// Whether `manifest` already configures `tool`.
///
/// An empty `[tool.<name>]` table does not count; any non-table value does.
pub fn is_configured(manifest: &Manifest, tool: ToolName) -> bool {
    match manifest.get(&["tool", tool.as_str()]) {
        None => false,
        Some(item) => item.as_table_like().is_none_or(|table| !table.is_empty()),
    }
}

/// Insert `defaults` as `[tool.<name>]` unless the manifest already configures the tool.
pub fn ensure(manifest: &mut Manifest, tool: ToolName, defaults: &Table) -> WriteOutcome {
    if is_configured(manifest, tool) {
        debug!("`tool.{tool}` is already configured, leaving it untouched");
        return WriteOutcome::AlreadyConfigured;
    }

    let document = manifest.document_mut();
    let root = document.as_table_mut();
    match root.get_mut("tool") {
        None => {
            let mut table = Table::new();
            table.set_implicit(true);
            table.insert(tool.as_str(), Item::Table(detach(defaults)));
            root.insert("tool", Item::Table(table));
        }
        Some(Item::Table(table)) => {
            table.insert(tool.as_str(), Item::Table(detach(defaults)));
        }
        Some(Item::Value(toml_edit::Value::InlineTable(table))) => {
            table.insert(
                tool.as_str(),
                toml_edit::Value::InlineTable(defaults.clone().into_inline_table()),
            );
        }
        Some(_) => {
            debug!("`tool` in the manifest is not a table, leaving it untouched");
            return WriteOutcome::AlreadyConfigured;
        }
    }
    debug!("Wrote default `tool.{tool}` configuration");
    WriteOutcome::Written
}

/// Copy `table` without positions or decor from the document it was parsed from.
fn detach(table: &Table) -> Table {
    let mut copy = Table::new();
    copy.set_implicit(table.is_implicit());
    for (key, item) in table {
        match item {
            Item::None => {}
            Item::Value(value) => {
                let mut value = value.clone();
                value.decor_mut().clear();
                copy.insert(key, Item::Value(value));
            }
            Item::Table(table) => {
                copy.insert(key, Item::Table(detach(table)));
            }
            Item::ArrayOfTables(array) => {
                let mut tables = ArrayOfTables::new();
                for table in array.iter() {
                    tables.push(detach(table));
                }
                copy.insert(key, Item::ArrayOfTables(tables));
            }
        }
    }
    copy
}
