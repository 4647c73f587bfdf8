//! Classify the Python-project shape of a directory.
//!
//! Markers are checked in a fixed priority order; the first match decides the
//! state. Modification times are never consulted.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::project::error::DetectionError;
use crate::project::probe;

/// The unified manifest.
pub const PYPROJECT_TOML: &str = "pyproject.toml";

/// uv's lockfile, which upgrades a manifest-only project to a uv project.
pub const UV_LOCK: &str = "uv.lock";

/// The legacy flat requirements list.
pub const REQUIREMENTS_TXT: &str = "requirements.txt";

/// Virtual environment directories, in lookup order.
pub const VENV_DIRS: &[&str] = &[".venv", "venv"];

/// Tables that make a `pyproject.toml` a project manifest, as dotted keys.
pub const PROJECT_MARKERS: &[&str] = &["project", "tool.poetry", "tool.pdm", "build-system"];

/// The detected shape of an existing directory.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectState {
    /// No marker at all.
    NoProject,
    /// A project manifest with a `uv.lock` beside it.
    UvProject,
    /// A `requirements.txt` without a project manifest.
    RequirementsOnly,
    /// A project manifest without `uv.lock`.
    PyprojectOnly,
    /// Only a virtual environment directory.
    VenvOnly,
}

impl fmt::Display for ProjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoProject => "no project",
            Self::UvProject => "uv project",
            Self::RequirementsOnly => "requirements.txt only",
            Self::PyprojectOnly => "pyproject.toml only",
            Self::VenvOnly => "virtual environment only",
        })
    }
}

/// Detect the project state of `directory`.
///
/// Priority order:
/// 1. `pyproject.toml` with a project marker: [`ProjectState::UvProject`] when
///    `uv.lock` exists, otherwise [`ProjectState::PyprojectOnly`]
/// 2. `requirements.txt`: [`ProjectState::RequirementsOnly`]
/// 3. `.venv/` or `venv/`: [`ProjectState::VenvOnly`]
/// 4. [`ProjectState::NoProject`]
pub fn detect(directory: &Path) -> Result<ProjectState, DetectionError> {
    probe::ensure_readable_dir(directory).map_err(|err| DetectionError::new(directory, err))?;

    let check = |name: &str, predicate: fn(&Path) -> std::io::Result<bool>| {
        let path = directory.join(name);
        predicate(&path).map_err(|err| DetectionError::new(path, err))
    };

    let pyproject = directory.join(PYPROJECT_TOML);
    let has_manifest = probe::read_toml(&pyproject)
        .map_err(|err| DetectionError::new(&pyproject, err))?
        .is_some_and(|document| {
            PROJECT_MARKERS
                .iter()
                .any(|key| probe::has_table(&document, key))
        });

    let state = if has_manifest {
        if check(UV_LOCK, probe::is_file)? {
            ProjectState::UvProject
        } else {
            ProjectState::PyprojectOnly
        }
    } else if check(REQUIREMENTS_TXT, probe::is_file)? {
        ProjectState::RequirementsOnly
    } else if has_venv(directory)? {
        ProjectState::VenvOnly
    } else {
        ProjectState::NoProject
    };

    debug!("Detected {state} in `{}`", directory.display());
    Ok(state)
}

fn has_venv(directory: &Path) -> Result<bool, DetectionError> {
    for name in VENV_DIRS {
        let path = directory.join(name);
        if probe::is_dir(&path).map_err(|err| DetectionError::new(&path, err))? {
            return Ok(true);
        }
    }
    Ok(false)
}
