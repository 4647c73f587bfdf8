//! Package-manager resolution.
//!
//! Resolution is an ordered-priority match: explicit choice, then lockfiles,
//! then manifest tables, then a `requirements.txt` (pip), then (outside
//! [`ProjectState::NoProject`]) a single manager executable on the host.
//! Anything else is handed back to the caller as
//! [`Resolution::NeedsUserChoice`]; this module never prompts.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, trace};

use crate::project::detect::{PYPROJECT_TOML, ProjectState, REQUIREMENTS_TXT};
use crate::project::error::DetectionError;
use crate::project::probe;

/// A Python package manager.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManagerKind {
    Uv,
    Pip,
    Poetry,
    Pdm,
    Unknown,
}

impl PackageManagerKind {
    /// Every concrete manager, in lockfile priority order.
    pub const CONCRETE: [Self; 4] = [Self::Uv, Self::Poetry, Self::Pdm, Self::Pip];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uv => "uv",
            Self::Pip => "pip",
            Self::Poetry => "poetry",
            Self::Pdm => "pdm",
            Self::Unknown => "unknown",
        }
    }

    /// The file whose presence proves this manager governs a project.
    ///
    /// pip has no lockfile; its requirements list plays that role.
    pub fn lockfile(self) -> Option<&'static str> {
        match self {
            Self::Uv => Some("uv.lock"),
            Self::Poetry => Some("poetry.lock"),
            Self::Pdm => Some("pdm.lock"),
            Self::Pip => Some(REQUIREMENTS_TXT),
            Self::Unknown => None,
        }
    }

    /// Executable names that indicate the manager is installed.
    pub fn executables(self) -> &'static [&'static str] {
        match self {
            Self::Uv => &["uv"],
            Self::Poetry => &["poetry"],
            Self::Pdm => &["pdm"],
            Self::Pip => &["pip", "pip3"],
            Self::Unknown => &[],
        }
    }
}

impl fmt::Display for PackageManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageManagerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::CONCRETE
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown package manager: {s}"))
    }
}

/// How a package manager was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "evidence", rename_all = "kebab-case")]
pub enum Provenance {
    /// Passed in by the caller.
    Explicit,
    /// A lockfile (or pip's requirements list) exists.
    Lockfile(&'static str),
    /// The manifest has a manager-specific table.
    Manifest(&'static str),
    /// Exactly one manager executable is on the host.
    HostExecutable(String),
    /// Selected by the user after [`Resolution::NeedsUserChoice`].
    Prompted,
}

impl Provenance {
    /// Backed by a marker file in the project.
    pub fn is_hard(&self) -> bool {
        matches!(self, Self::Lockfile(_) | Self::Manifest(_))
    }

    /// Inferred from the host rather than the project.
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::HostExecutable(_))
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => f.write_str("explicitly requested"),
            Self::Lockfile(file) => write!(f, "found `{file}`"),
            Self::Manifest(table) => write!(f, "found `[{table}]` in {PYPROJECT_TOML}"),
            Self::HostExecutable(exe) => write!(f, "only `{exe}` is installed"),
            Self::Prompted => f.write_str("selected"),
        }
    }
}

/// A resolved package manager and the evidence behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPackageManager {
    pub kind: PackageManagerKind,
    pub provenance: Provenance,
}

impl ResolvedPackageManager {
    pub fn new(kind: PackageManagerKind, provenance: Provenance) -> Self {
        Self { kind, provenance }
    }
}

/// The outcome of [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedPackageManager),
    /// No evidence decides; the caller must ask the user to pick one of `candidates`.
    NeedsUserChoice {
        candidates: Vec<PackageManagerKind>,
    },
}

impl Resolution {
    pub fn resolved(&self) -> Option<&ResolvedPackageManager> {
        match self {
            Self::Resolved(resolved) => Some(resolved),
            Self::NeedsUserChoice { .. } => None,
        }
    }
}

/// Discovery of executables on the host.
pub trait HostTools {
    /// Returns `true` if `executable` can be found on the host.
    fn has_executable(&self, executable: &str) -> bool;
}

/// [`HostTools`] backed by a `PATH` search.
#[derive(Debug, Default, Copy, Clone)]
pub struct PathHostTools;

impl HostTools for PathHostTools {
    fn has_executable(&self, executable: &str) -> bool {
        which::which(executable).is_ok()
    }
}

/// Manifest tables that tie a project to one manager, in priority order.
const MANIFEST_MARKERS: &[(&str, PackageManagerKind)] = &[
    ("tool.poetry", PackageManagerKind::Poetry),
    ("tool.pdm", PackageManagerKind::Pdm),
    ("tool.uv", PackageManagerKind::Uv),
];

/// Determine which package manager governs `directory`.
pub fn resolve(
    directory: &Path,
    state: ProjectState,
    explicit: Option<PackageManagerKind>,
    host: &dyn HostTools,
) -> Result<Resolution, DetectionError> {
    if let Some(kind) = explicit {
        debug!("Using explicitly requested package manager: {kind}");
        return Ok(Resolution::Resolved(ResolvedPackageManager::new(
            kind,
            Provenance::Explicit,
        )));
    }

    // pip's requirements list is weaker evidence than a manager-specific table.
    let (lockfiles, requirements) = PackageManagerKind::CONCRETE.split_at(3);
    if let Some(resolved) = find_lockfile(directory, lockfiles)? {
        return Ok(Resolution::Resolved(resolved));
    }

    let pyproject = directory.join(PYPROJECT_TOML);
    if let Some(document) =
        probe::read_toml(&pyproject).map_err(|err| DetectionError::new(&pyproject, err))?
    {
        for &(table, kind) in MANIFEST_MARKERS {
            if probe::has_table(&document, table) {
                debug!("Found `[{table}]` in {PYPROJECT_TOML}, using {kind}");
                return Ok(Resolution::Resolved(ResolvedPackageManager::new(
                    kind,
                    Provenance::Manifest(table),
                )));
            }
        }
    }

    if let Some(resolved) = find_lockfile(directory, requirements)? {
        return Ok(Resolution::Resolved(resolved));
    }

    if state == ProjectState::NoProject {
        return Ok(Resolution::NeedsUserChoice {
            candidates: PackageManagerKind::CONCRETE.to_vec(),
        });
    }

    let installed: Vec<(PackageManagerKind, &str)> = PackageManagerKind::CONCRETE
        .into_iter()
        .filter_map(|kind| {
            kind.executables()
                .iter()
                .find(|exe| host.has_executable(exe))
                .map(|exe| (kind, *exe))
        })
        .collect();
    trace!("Package managers on the host: {installed:?}");

    match installed.as_slice() {
        [(kind, exe)] => {
            debug!("Only `{exe}` is installed, using {kind}");
            Ok(Resolution::Resolved(ResolvedPackageManager::new(
                *kind,
                Provenance::HostExecutable((*exe).to_owned()),
            )))
        }
        [] => Ok(Resolution::NeedsUserChoice {
            candidates: PackageManagerKind::CONCRETE.to_vec(),
        }),
        found => Ok(Resolution::NeedsUserChoice {
            candidates: found.iter().map(|(kind, _)| *kind).collect(),
        }),
    }
}

fn find_lockfile(
    directory: &Path,
    kinds: &[PackageManagerKind],
) -> Result<Option<ResolvedPackageManager>, DetectionError> {
    for &kind in kinds {
        let Some(lockfile) = kind.lockfile() else {
            continue;
        };
        let path = directory.join(lockfile);
        if probe::is_file(&path).map_err(|err| DetectionError::new(&path, err))? {
            debug!("Found `{lockfile}`, using {kind}");
            return Ok(Some(ResolvedPackageManager::new(
                kind,
                Provenance::Lockfile(lockfile),
            )));
        }
    }
    Ok(None)
}
