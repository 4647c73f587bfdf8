//! The `pyproject.toml` manifest.
//!
//! Edits go through [`toml_edit`] so that every section the engine does not
//! touch keeps its exact formatting, comments included. The manifest remembers
//! the text it was loaded from and is only written back when that changes.

use std::fmt::{self, Write as _};
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use toml_edit::{Array, DocumentMut, InlineTable, Item, Table, TableLike, Value};
use tracing::debug;
use uv_normalize::PackageName;
use uv_pep508::Requirement;

use crate::project::detect::PYPROJECT_TOML;
use crate::project::error::InitError;
use crate::project::package_manager::PackageManagerKind;
use crate::project::requirements::DependencyRecord;

/// A loaded (or freshly scaffolded) `pyproject.toml`.
#[derive(Debug)]
pub struct Manifest {
    path: PathBuf,
    document: DocumentMut,
    /// The on-disk text, `None` if the file does not exist yet.
    original: Option<String>,
}

/// The result of [`Manifest::load`].
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(Manifest),
    Missing,
    /// The file exists but is not valid TOML; it is left untouched.
    Invalid(toml_edit::TomlError),
}

impl Manifest {
    /// Load `pyproject.toml` from `directory`.
    pub fn load(directory: &Path) -> Result<LoadOutcome, InitError> {
        let path = directory.join(PYPROJECT_TOML);
        let content = match fs_err::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(LoadOutcome::Missing);
            }
            Err(err) => return Err(InitError::Read { path, err }),
        };
        match content.parse::<DocumentMut>() {
            Ok(document) => Ok(LoadOutcome::Loaded(Self {
                path,
                document,
                original: Some(content),
            })),
            Err(err) => Ok(LoadOutcome::Invalid(err)),
        }
    }

    /// Parse manifest text that is not backed by a file yet.
    pub fn from_content(path: PathBuf, content: &str) -> Result<Self, toml_edit::TomlError> {
        Ok(Self {
            path,
            document: content.parse()?,
            original: None,
        })
    }

    /// Scaffold a new manifest for `directory`.
    pub fn scaffold(
        directory: &Path,
        kind: PackageManagerKind,
        requires_python: Option<&str>,
    ) -> Self {
        let mut content = String::with_capacity(256);

        // Writing to a `String` is infallible.
        let _ = writeln!(content, "[project]");
        let _ = writeln!(content, "name = {}", Value::from(project_name_from_dir(directory)));
        let _ = writeln!(content, "version = \"0.1.0\"");
        if let Some(version) = requires_python {
            let _ = writeln!(content, "requires-python = {}", Value::from(format!(">={version}")));
        }
        let _ = writeln!(content, "dependencies = []");
        let _ = writeln!(content);

        let (requires, backend) = build_backend(kind);
        let _ = writeln!(content, "[build-system]");
        let _ = writeln!(content, "requires = [\"{requires}\"]");
        let _ = writeln!(content, "build-backend = \"{backend}\"");

        let document = content.parse().unwrap_or_else(|err| {
            debug!("Scaffolded manifest did not parse: {err}");
            DocumentMut::new()
        });
        Self {
            path: directory.join(PYPROJECT_TOML),
            document,
            original: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the rendered document differs from the file on disk.
    pub fn is_dirty(&self) -> bool {
        self.original.as_deref() != Some(self.document.to_string().as_str())
    }

    /// Write the manifest if it changed. Returns `true` if the file was written.
    pub fn save(&mut self) -> Result<bool, InitError> {
        if !self.is_dirty() {
            return Ok(false);
        }
        let content = self.document.to_string();
        fs_err::write(&self.path, &content).map_err(|err| InitError::Write {
            path: self.path.clone(),
            err,
        })?;
        self.original = Some(content);
        Ok(true)
    }

    pub fn document_mut(&mut self) -> &mut DocumentMut {
        &mut self.document
    }

    /// Look up a dotted path of tables, e.g. `["tool", "ruff"]`.
    pub fn get(&self, path: &[&str]) -> Option<&Item> {
        let (first, rest) = path.split_first()?;
        let mut item = self.document.get(first)?;
        for key in rest {
            item = item.as_table_like()?.get(key)?;
        }
        Some(item)
    }

    /// The names already listed in `section`.
    pub fn dependency_names(&self, section: &DependencySection) -> Vec<PackageName> {
        let Some(item) = self.get(&section.path()) else {
            return Vec::new();
        };
        if section.is_table() {
            item.as_table_like()
                .map(|table| {
                    table
                        .iter()
                        .map(|(key, _)| key)
                        .filter(|key| !key.eq_ignore_ascii_case("python"))
                        .filter_map(|key| PackageName::from_str(key).ok())
                        .collect()
                })
                .unwrap_or_default()
        } else {
            item.as_array()
                .map(|array| {
                    array
                        .iter()
                        .filter_map(Value::as_str)
                        .filter_map(requirement_name)
                        .collect()
                })
                .unwrap_or_default()
        }
    }

    /// Append `records` to `section`, creating it when absent.
    ///
    /// Fails without modifying anything if a table along the way, or the
    /// section itself, has an unexpected type.
    pub fn append_dependencies(
        &mut self,
        section: &DependencySection,
        records: &[DependencyRecord],
    ) -> Result<(), ShapeError> {
        if records.is_empty() {
            return Ok(());
        }
        let path = section.path();
        let (last, parents) = path.split_last().ok_or_else(|| ShapeError::new(section))?;

        // Validate first so that a failure leaves the document untouched.
        self.check_shape(section, parents, last)?;

        if *section == DependencySection::Project && self.document.get("project").is_none() {
            let mut project = Table::new();
            project.insert("name", toml_edit::value(project_name_from_path(&self.path)));
            project.insert("version", toml_edit::value("0.1.0"));
            self.document.insert("project", Item::Table(project));
        }

        let parent = ensure_tables(self.document.as_table_mut(), parents);
        if section.is_table() {
            let table = parent
                .entry(last)
                .or_insert_with(|| Item::Table(Table::new()))
                .as_table_like_mut()
                .ok_or_else(|| ShapeError::new(section))?;
            for record in records {
                table.insert(record.name.as_str(), poetry_item(record));
            }
        } else {
            let array = parent
                .entry(last)
                .or_insert_with(|| toml_edit::value(Array::new()))
                .as_array_mut()
                .ok_or_else(|| ShapeError::new(section))?;
            append_to_array(array, records);
        }
        Ok(())
    }

    fn check_shape(
        &self,
        section: &DependencySection,
        parents: &[&str],
        last: &str,
    ) -> Result<(), ShapeError> {
        let mut table: Option<&dyn TableLike> = Some(self.document.as_table());
        for key in parents {
            table = match table.and_then(|table| table.get(key)) {
                None => None,
                Some(item) => Some(
                    item.as_table_like()
                        .ok_or_else(|| ShapeError::new(section))?,
                ),
            };
        }
        if let Some(item) = table.and_then(|table| table.get(last)) {
            let valid = if section.is_table() {
                item.is_table_like()
            } else {
                item.is_array()
            };
            if !valid {
                return Err(ShapeError::new(section));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.document)
    }
}

/// A manifest location that holds dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencySection {
    /// `project.dependencies`
    Project,
    /// `dependency-groups.<name>`
    Group(String),
    /// `tool.pdm.dev-dependencies.<name>`
    PdmDev(String),
    /// `tool.poetry.dependencies`
    Poetry,
    /// `tool.poetry.group.<name>.dependencies`
    PoetryGroup(String),
}

impl DependencySection {
    /// Where runtime dependencies go for `kind`.
    pub fn main(kind: PackageManagerKind, manifest: &Manifest) -> Self {
        if kind == PackageManagerKind::Poetry && manifest.get(&Self::Poetry.path()).is_some() {
            Self::Poetry
        } else {
            Self::Project
        }
    }

    /// Where development dependencies go for `kind`.
    pub fn dev(kind: PackageManagerKind) -> Self {
        match kind {
            PackageManagerKind::Poetry => Self::PoetryGroup("dev".to_owned()),
            PackageManagerKind::Pdm => Self::PdmDev("dev".to_owned()),
            PackageManagerKind::Uv | PackageManagerKind::Pip | PackageManagerKind::Unknown => {
                Self::Group("dev".to_owned())
            }
        }
    }

    pub fn path(&self) -> Vec<&str> {
        match self {
            Self::Project => vec!["project", "dependencies"],
            Self::Group(name) => vec!["dependency-groups", name],
            Self::PdmDev(name) => vec!["tool", "pdm", "dev-dependencies", name],
            Self::Poetry => vec!["tool", "poetry", "dependencies"],
            Self::PoetryGroup(name) => vec!["tool", "poetry", "group", name, "dependencies"],
        }
    }

    /// Poetry sections map names to constraints; the rest are PEP 508 arrays.
    pub fn is_table(&self) -> bool {
        matches!(self, Self::Poetry | Self::PoetryGroup(_))
    }
}

impl fmt::Display for DependencySection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path().join("."))
    }
}

/// A manifest key had a type that cannot hold dependencies.
#[derive(Debug, thiserror::Error)]
#[error("`{section}` in {PYPROJECT_TOML} has an unexpected type")]
pub struct ShapeError {
    section: DependencySection,
}

impl ShapeError {
    fn new(section: &DependencySection) -> Self {
        Self {
            section: section.clone(),
        }
    }
}

/// Walk (and create) standard tables along `path`. Shape is validated by the caller.
fn ensure_tables<'a>(root: &'a mut Table, path: &[&str]) -> &'a mut dyn TableLike {
    let mut table: &mut dyn TableLike = root;
    for key in path {
        let item = table.entry(key).or_insert_with(|| {
            let mut table = Table::new();
            table.set_implicit(true);
            Item::Table(table)
        });
        // `check_shape` ran before any mutation.
        table = match item.as_table_like_mut() {
            Some(table) => table,
            None => unreachable!("manifest shape is validated before editing"),
        };
    }
    table
}

/// Append PEP 508 strings, matching the array's existing layout.
///
/// In a multi-line array, comments after the last element stay attached to it,
/// after the comma that separates it from the new elements.
fn append_to_array(array: &mut Array, records: &[DependencyRecord]) {
    let prefixes: Vec<&str> = array
        .iter()
        .filter_map(|value| value.decor().prefix().and_then(|prefix| prefix.as_str()))
        .collect();
    let multiline = array.is_empty() || prefixes.iter().any(|prefix| prefix.contains('\n'));
    if !multiline {
        for record in records {
            array.push(record.to_string());
        }
        return;
    }

    let indent = prefixes
        .last()
        .and_then(|prefix| prefix.rsplit_once('\n'))
        .map_or("    ", |(_, indent)| indent)
        .to_owned();
    // Without a trailing comma, the comment after the last element is part of
    // its suffix and would end up before the new comma.
    let mut trailing = String::new();
    if !array.trailing_comma() {
        if let Some(last) = array.iter_mut().last() {
            let suffix = last.decor().suffix().and_then(|suffix| suffix.as_str());
            if let Some(suffix) = suffix.filter(|suffix| suffix.contains('\n')) {
                trailing.push_str(suffix);
                last.decor_mut().set_suffix("");
            }
        }
    }
    trailing.push_str(array.trailing().as_str().unwrap_or_default());
    // Text before the first new element, and the indentation of the closing bracket.
    let (before, closing) = match trailing.rsplit_once('\n') {
        Some((before, closing)) => (format!("{before}\n"), closing.to_owned()),
        None => ("\n".to_owned(), String::new()),
    };

    for (index, record) in records.iter().enumerate() {
        let prefix = if index == 0 {
            format!("{before}{indent}")
        } else {
            format!("\n{indent}")
        };
        array.push_formatted(Value::from(record.to_string()).decorated(prefix, ""));
    }
    array.set_trailing(format!("\n{closing}"));
    array.set_trailing_comma(true);
}

/// A Poetry dependency entry: a bare constraint or an inline table.
fn poetry_item(record: &DependencyRecord) -> Item {
    if record.extras.is_empty() && record.marker.is_none() && record.url.is_none() {
        return toml_edit::value(record.poetry_version());
    }
    let mut table = InlineTable::new();
    if let Some(url) = &record.url {
        table.insert("url", url.as_str().into());
    } else {
        table.insert("version", record.poetry_version().into());
    }
    if !record.extras.is_empty() {
        table.insert("extras", Value::Array(record.extras.iter().map(String::as_str).collect()));
    }
    if let Some(marker) = &record.marker {
        table.insert("markers", marker.as_str().into());
    }
    toml_edit::value(table)
}

/// The package name of a PEP 508 string already in the manifest.
fn requirement_name(requirement: &str) -> Option<PackageName> {
    match requirement.parse::<Requirement>() {
        Ok(requirement) => Some(requirement.name),
        Err(err) => {
            debug!("Ignoring unparsable dependency `{requirement}`: {}", err.message);
            None
        }
    }
}

/// The build backend scaffolded for each manager.
fn build_backend(kind: PackageManagerKind) -> (&'static str, &'static str) {
    match kind {
        PackageManagerKind::Uv => ("uv_build>=0.8.0,<0.9", "uv_build"),
        PackageManagerKind::Poetry => ("poetry-core>=2.0.0,<3.0.0", "poetry.core.masonry.api"),
        PackageManagerKind::Pdm => ("pdm-backend", "pdm.backend"),
        PackageManagerKind::Pip | PackageManagerKind::Unknown => ("hatchling", "hatchling.build"),
    }
}

/// Derive a valid project name from the project directory.
///
/// Falls back to `"project"` if the directory name has no usable characters
/// (temporary directories often start with `.tmp`).
pub fn project_name_from_dir(project_dir: &Path) -> String {
    let raw = project_dir
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let name: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    PackageName::from_str(name.trim_matches('-'))
        .map_or_else(|_| "project".to_owned(), |name| name.to_string())
}

fn project_name_from_path(manifest_path: &Path) -> String {
    manifest_path
        .parent()
        .map(project_name_from_dir)
        .unwrap_or_else(|| "project".to_owned())
}
