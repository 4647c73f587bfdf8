//! Parsing of legacy `requirements.txt` files into [`DependencyRecord`]s.
//!
//! Each requirement is parsed with `uv-pep508`; this module only handles the
//! requirements-file layer around it: line continuations, comments, `-r`
//! includes and pip options. Lines that cannot be migrated are reported as a
//! [`ParseWarning`] instead of being silently dropped.

use std::fmt;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::trace;
use uv_normalize::PackageName;
use uv_pep508::{Requirement, VersionOrUrl};

/// A package requirement taken from a requirements line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyRecord {
    pub name: PackageName,
    pub extras: Vec<String>,
    /// Comma-separated version clauses without whitespace, e.g. `>=1.0,<2`.
    pub constraint: Option<String>,
    /// Direct reference (`name @ url`).
    pub url: Option<String>,
    /// PEP 508 environment marker.
    pub marker: Option<String>,
}

impl DependencyRecord {
    /// Parse a single requirement (no options, no comments).
    pub fn parse(requirement: &str) -> Result<Self, String> {
        let requirement = requirement
            .parse::<Requirement>()
            .map_err(|err| err.message.to_string())?;

        let (constraint, url) = match &requirement.version_or_url {
            None => (None, None),
            Some(VersionOrUrl::VersionSpecifier(specifiers)) => {
                let clauses: Vec<String> = specifiers.iter().map(ToString::to_string).collect();
                ((!clauses.is_empty()).then(|| clauses.join(",")), None)
            }
            Some(VersionOrUrl::Url(url)) => (None, Some(url.given().map_or_else(|| url.to_string(), ToString::to_string))),
        };

        Ok(Self {
            extras: requirement.extras.iter().map(ToString::to_string).collect(),
            marker: requirement
                .marker
                .contents()
                .map(|contents| contents.to_string()),
            name: requirement.name,
            constraint,
            url,
        })
    }

    /// Version constraint in Poetry's table syntax (`*` when unconstrained).
    pub fn poetry_version(&self) -> &str {
        self.constraint.as_deref().unwrap_or("*")
    }
}

impl fmt::Display for DependencyRecord {
    /// Render as a PEP 508 requirement string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        if let Some(url) = &self.url {
            write!(f, " @ {url}")?;
        } else if let Some(constraint) = &self.constraint {
            f.write_str(constraint)?;
        }
        if let Some(marker) = &self.marker {
            // A space is required between a URL and the marker separator.
            if self.url.is_some() {
                f.write_str(" ")?;
            }
            write!(f, "; {marker}")?;
        }
        Ok(())
    }
}

/// A requirements line that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseWarning {
    pub file: PathBuf,
    /// 1-based line number of the first physical line.
    pub line: usize,
    pub content: String,
    pub reason: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: skipped `{}` ({})",
            self.file.display(),
            self.line,
            self.content,
            self.reason
        )
    }
}

/// The parsed contents of a requirements file and its includes.
#[derive(Debug, Default)]
pub struct RequirementsFile {
    /// Records in source order, includes expanded in place.
    pub records: Vec<DependencyRecord>,
    pub warnings: Vec<ParseWarning>,
}

impl RequirementsFile {
    /// Read and parse the requirements file at `path`, following `-r` includes.
    ///
    /// Warnings name files relative to `base` when possible.
    pub fn from_path(path: &Path, base: &Path) -> std::io::Result<Self> {
        let mut parsed = Self::default();
        let mut visited = FxHashSet::default();
        parsed.read(path, base, &mut visited)?;
        Ok(parsed)
    }

    /// Parse requirements text without include support.
    pub fn parse(content: &str, file: &Path) -> Self {
        let mut parsed = Self::default();
        for (line, text) in logical_lines(content) {
            match classify(&text) {
                Line::Requirement(requirement) => parsed.push_requirement(requirement, file, line),
                Line::Include(target) => parsed.warn(
                    file,
                    line,
                    &text,
                    format!("cannot include `{target}` here"),
                ),
                Line::Unsupported(reason) => parsed.warn(file, line, &text, reason),
            }
        }
        parsed
    }

    fn read(
        &mut self,
        path: &Path,
        base: &Path,
        visited: &mut FxHashSet<PathBuf>,
    ) -> std::io::Result<()> {
        let canonical = fs_err::canonicalize(path)?;
        if !visited.insert(canonical) {
            trace!("Skipping already included `{}`", path.display());
            return Ok(());
        }

        let content = fs_err::read_to_string(path)?;
        let display = path.strip_prefix(base).unwrap_or(path).to_path_buf();
        let parent = path.parent().unwrap_or(base);

        for (line, text) in logical_lines(&content) {
            match classify(&text) {
                Line::Requirement(requirement) => {
                    self.push_requirement(requirement, &display, line);
                }
                Line::Include(target) => {
                    let included = parent.join(target);
                    if included.is_file() {
                        self.read(&included, base, visited)?;
                    } else {
                        self.warn(
                            &display,
                            line,
                            &text,
                            format!("included file `{target}` does not exist"),
                        );
                    }
                }
                Line::Unsupported(reason) => self.warn(&display, line, &text, reason),
            }
        }
        Ok(())
    }

    fn push_requirement(&mut self, requirement: &str, file: &Path, line: usize) {
        match DependencyRecord::parse(requirement) {
            Ok(record) => self.records.push(record),
            Err(reason) => self.warn(file, line, requirement, reason),
        }
    }

    fn warn(&mut self, file: &Path, line: usize, content: &str, reason: String) {
        self.warnings.push(ParseWarning {
            file: file.to_path_buf(),
            line,
            content: content.to_owned(),
            reason,
        });
    }
}

enum Line<'a> {
    Requirement(&'a str),
    Include(&'a str),
    Unsupported(String),
}

fn classify(text: &str) -> Line<'_> {
    if let Some(option) = text.strip_prefix('-') {
        let (flag, value) = match option.split_once(|c: char| c == '=' || c.is_whitespace()) {
            Some((flag, value)) => (flag, value.trim()),
            None => (option, ""),
        };
        return match flag {
            "r" | "-requirement" if !value.is_empty() => Line::Include(value),
            "e" | "-editable" => {
                Line::Unsupported("editable installs are not migrated".to_owned())
            }
            "c" | "-constraint" => {
                Line::Unsupported("constraint files are not migrated".to_owned())
            }
            _ => Line::Unsupported(format!("unsupported option `-{flag}`")),
        };
    }

    if text.contains("://") && !text.contains('@') {
        return Line::Unsupported(
            "requirements without a package name are not migrated".to_owned(),
        );
    }

    // Per-requirement options (`--hash`) follow the requirement itself.
    let requirement = match text.find(" --") {
        Some(index) => text[..index].trim_end(),
        None => text,
    };
    Line::Requirement(requirement)
}

/// Yield `(line number, text)` for every non-empty logical line, joining `\`
/// continuations and stripping comments.
fn logical_lines(content: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (index, raw) in content.lines().enumerate() {
        let (start, mut text) = pending.take().unwrap_or((index + 1, String::new()));
        let stripped = strip_comment(raw);

        if let Some(continued) = stripped.strip_suffix('\\') {
            text.push_str(continued);
            text.push(' ');
            pending = Some((start, text));
            continue;
        }

        text.push_str(stripped);
        let text = text.trim();
        if !text.is_empty() {
            lines.push((start, text.to_owned()));
        }
    }

    if let Some((start, text)) = pending {
        let text = text.trim();
        if !text.is_empty() {
            lines.push((start, text.to_owned()));
        }
    }

    lines
}

/// Remove a `#` comment that starts the line or follows whitespace.
fn strip_comment(line: &str) -> &str {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        return "";
    }
    let bytes = line.as_bytes();
    for (index, byte) in bytes.iter().enumerate() {
        if *byte == b'#' && index > 0 && bytes[index - 1].is_ascii_whitespace() {
            return line[..index].trim_end();
        }
    }
    line.trim_end()
}
