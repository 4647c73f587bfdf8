//! Migration of requirements files into the manifest.

use std::io;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::debug;
use uv_normalize::PackageName;

use crate::project::manifest::{DependencySection, Manifest, ShapeError};
use crate::project::requirements::{DependencyRecord, ParseWarning, RequirementsFile};

/// What a single migration changed.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    /// The requirements file, relative to the project directory.
    pub source: PathBuf,
    pub section: DependencySection,
    /// Records appended to the manifest, in source order.
    pub added: Vec<DependencyRecord>,
    /// Records whose name was already declared, in the manifest or earlier in
    /// the source.
    pub skipped: Vec<DependencyRecord>,
    pub warnings: Vec<ParseWarning>,
}

impl MigrationReport {
    /// Whether the migration changed the manifest.
    pub fn is_noop(&self) -> bool {
        self.added.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("failed to read `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

impl MigrationError {
    /// Whether the run must stop. Undecodable files and mis-shaped manifest
    /// sections are skipped with a warning instead.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Read { err, .. } => err.kind() != io::ErrorKind::InvalidData,
            Self::Shape(_) => false,
        }
    }
}

/// Merge the requirements at `requirements` into `section` of `manifest`.
///
/// Names already present in the section keep their existing declaration;
/// everything else is appended in source order. The requirements file itself
/// is never modified, so the migration can be repeated: a second run adds
/// nothing.
///
/// On error the manifest is left unmodified.
pub fn migrate(
    directory: &Path,
    requirements: &Path,
    manifest: &mut Manifest,
    section: &DependencySection,
) -> Result<MigrationReport, MigrationError> {
    migrate_with(directory, requirements, manifest, section, &[])
}

/// Like [`migrate`], but names declared in any of `also_declared` are skipped as
/// well. Used for dev requirements files, which usually include the main list.
pub fn migrate_with(
    directory: &Path,
    requirements: &Path,
    manifest: &mut Manifest,
    section: &DependencySection,
    also_declared: &[&DependencySection],
) -> Result<MigrationReport, MigrationError> {
    let parsed =
        RequirementsFile::from_path(requirements, directory).map_err(|err| MigrationError::Read {
            path: requirements.to_path_buf(),
            err,
        })?;

    let mut seen: FxHashSet<PackageName> = std::iter::once(section)
        .chain(also_declared.iter().copied())
        .flat_map(|section| manifest.dependency_names(section))
        .collect();
    let (added, skipped): (Vec<_>, Vec<_>) = parsed
        .records
        .into_iter()
        .partition(|record| seen.insert(record.name.clone()));

    manifest.append_dependencies(section, &added)?;

    let source = requirements
        .strip_prefix(directory)
        .unwrap_or(requirements)
        .to_path_buf();
    debug!(
        "Migrated {} from `{}` into `{section}` ({} already declared, {} skipped lines)",
        added.len(),
        source.display(),
        skipped.len(),
        parsed.warnings.len(),
    );

    Ok(MigrationReport {
        source,
        section: section.clone(),
        added,
        skipped,
        warnings: parsed.warnings,
    })
}
