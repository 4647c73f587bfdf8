//! The end-to-end `init` flow.

use std::io;
use std::path::Path;

use tracing::debug;

use crate::project::detect::{self, REQUIREMENTS_TXT};
use crate::project::error::InitError;
use crate::project::manifest::{DependencySection, LoadOutcome, Manifest};
use crate::project::migrate::{self, MigrationError};
use crate::project::package_manager::{
    self, HostTools, PackageManagerKind, Provenance, Resolution, ResolvedPackageManager,
};
use crate::project::probe;
use crate::project::prompt::InteractivePrompt;
use crate::project::result::{InitResult, ToolConfigOutcome, Warning};
use crate::project::runner::InstallPlan;
use crate::project::tool_config::{self, ToolDefaults, ToolName, WriteOutcome};

/// Development requirements files, migrated into the dev section.
pub const DEV_REQUIREMENTS: &[&str] = &[
    "requirements-dev.txt",
    "dev-requirements.txt",
    "requirements/dev.txt",
];

/// The pinned interpreter version, used for `requires-python`.
const PYTHON_VERSION_FILE: &str = ".python-version";

/// Receives progress messages from the orchestrator.
pub trait Reporter {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
}

/// Sequences detection, resolution, migration and tool configuration.
pub struct InitOrchestrator<'a> {
    prompt: &'a dyn InteractivePrompt,
    host: &'a dyn HostTools,
    reporter: &'a dyn Reporter,
    defaults: ToolDefaults,
}

impl<'a> InitOrchestrator<'a> {
    pub fn new(
        prompt: &'a dyn InteractivePrompt,
        host: &'a dyn HostTools,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            prompt,
            host,
            reporter,
            defaults: ToolDefaults::builtin(),
        }
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: ToolDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Initialize the project in `directory`.
    ///
    /// Only detection failures and filesystem read/write errors are returned as
    /// errors; everything else is recorded in the [`InitResult`]. The manifest
    /// is written at most once, after every edit has been applied in memory.
    pub fn run(
        &self,
        directory: &Path,
        explicit: Option<PackageManagerKind>,
    ) -> Result<InitResult, InitError> {
        let state = detect::detect(directory)?;
        let mut result = InitResult::new(directory.to_path_buf(), state);
        self.reporter.info(&format!("Detected {state}"));

        let Some(resolved) = self.resolve(directory, &mut result, explicit)? else {
            return Ok(result);
        };
        let kind = resolved.kind;
        self.reporter
            .info(&format!("Using {kind} ({})", resolved.provenance));
        result.package_manager = Some(resolved);

        let mut manifest = match Manifest::load(directory)? {
            LoadOutcome::Loaded(manifest) => manifest,
            LoadOutcome::Missing => {
                let python = python_version(directory)?;
                result.manifest_created = true;
                Manifest::scaffold(directory, kind, python.as_deref())
            }
            LoadOutcome::Invalid(err) => {
                self.warn(
                    &mut result,
                    Warning::InvalidManifest {
                        path: directory.join(detect::PYPROJECT_TOML),
                        message: err.message().trim().to_owned(),
                    },
                );
                return Ok(result);
            }
        };

        self.migrate_all(directory, kind, &mut manifest, &mut result)?;

        let checker = self.ensure_tools(kind, &mut manifest, &mut result);

        let dev = DependencySection::dev(kind);
        let declared = manifest.dependency_names(&dev);
        let missing: Vec<ToolName> = [ToolName::Ruff, checker, ToolName::Pytest]
            .into_iter()
            .filter(|tool| !declared.iter().any(|name| name.as_str() == tool.as_str()))
            .collect();
        result.install_plan = InstallPlan::for_kind(kind, &missing);

        result.manifest_written = manifest.save()?;
        if result.manifest_written {
            let verb = if result.manifest_created { "Created" } else { "Updated" };
            self.reporter
                .info(&format!("{verb} `{}`", manifest.path().display()));
        } else {
            self.reporter.info("Nothing to change");
        }
        Ok(result)
    }

    /// Resolve the package manager, prompting if needed. `None` stops the run.
    fn resolve(
        &self,
        directory: &Path,
        result: &mut InitResult,
        explicit: Option<PackageManagerKind>,
    ) -> Result<Option<ResolvedPackageManager>, InitError> {
        let resolution = package_manager::resolve(directory, result.state, explicit, self.host)?;
        let candidates = match resolution {
            Resolution::Resolved(resolved) => return Ok(Some(resolved)),
            Resolution::NeedsUserChoice { candidates } => candidates,
        };

        result.needed_user_choice = true;
        debug!("Asking for a package manager among {candidates:?}");
        match self.prompt.select(&candidates) {
            Ok(Some(kind)) => Ok(Some(ResolvedPackageManager::new(kind, Provenance::Prompted))),
            Ok(None) => {
                self.warn(
                    result,
                    Warning::NoSelection {
                        message: "no package manager selected; \
                                  pass `--package-manager` to choose one"
                            .to_owned(),
                    },
                );
                Ok(None)
            }
            Err(err) => {
                self.warn(
                    result,
                    Warning::NoSelection {
                        message: format!("failed to prompt for a package manager: {err}"),
                    },
                );
                Ok(None)
            }
        }
    }

    fn migrate_all(
        &self,
        directory: &Path,
        kind: PackageManagerKind,
        manifest: &mut Manifest,
        result: &mut InitResult,
    ) -> Result<(), InitError> {
        let main = DependencySection::main(kind, manifest);
        let dev = DependencySection::dev(kind);
        let sources = std::iter::once((REQUIREMENTS_TXT, &main, None))
            .chain(DEV_REQUIREMENTS.iter().map(|name| (*name, &dev, Some(&main))));

        for (name, section, declared_in) in sources {
            let path = directory.join(name);
            if !probe::is_file(&path).map_err(|err| InitError::Read {
                path: path.clone(),
                err,
            })? {
                continue;
            }

            let also_declared: Vec<&DependencySection> = declared_in.into_iter().collect();
            match migrate::migrate_with(directory, &path, manifest, section, &also_declared) {
                Ok(report) => {
                    for warning in &report.warnings {
                        self.warn(result, Warning::Requirement(warning.clone()));
                    }
                    if !report.is_noop() {
                        self.reporter.info(&format!(
                            "Migrated `{}` into `{section}` ({} added)",
                            report.source.display(),
                            report.added.len(),
                        ));
                    }
                    result.migrations.push(report);
                }
                Err(err) if err.is_fatal() => return Err(err.into()),
                Err(MigrationError::Read { path, err }) => self.warn(
                    result,
                    Warning::UnreadableRequirements {
                        path: path.strip_prefix(directory).unwrap_or(&path).to_path_buf(),
                        message: err.to_string(),
                    },
                ),
                Err(MigrationError::Shape(err)) => self.warn(
                    result,
                    Warning::DependencySection {
                        message: format!("{err}; `{name}` was not migrated"),
                    },
                ),
            }
        }
        Ok(())
    }

    /// Ensure every tool is configured and return the type checker in use.
    fn ensure_tools(
        &self,
        kind: PackageManagerKind,
        manifest: &mut Manifest,
        result: &mut InitResult,
    ) -> ToolName {
        let mut checker = ToolName::type_checker_for(kind);

        for tool in ToolName::for_kind(kind) {
            let existing_checker = tool.is_type_checker().then(|| {
                ToolName::ALL
                    .into_iter()
                    .filter(|other| other.is_type_checker())
                    .find(|other| tool_config::is_configured(manifest, *other))
            });
            let (tool, outcome) = match existing_checker.flatten() {
                Some(existing) => {
                    checker = existing;
                    (existing, WriteOutcome::AlreadyConfigured)
                }
                None => (tool, tool_config::ensure(manifest, tool, self.defaults.get(tool))),
            };

            match outcome {
                WriteOutcome::Written => {
                    self.reporter.info(&format!("Added default `[tool.{tool}]` configuration"));
                }
                WriteOutcome::AlreadyConfigured => {
                    self.reporter.info(&format!("Kept existing `[tool.{tool}]` configuration"));
                }
            }
            result.tool_configs.push(ToolConfigOutcome { tool, outcome });
        }
        checker
    }

    fn warn(&self, result: &mut InitResult, warning: Warning) {
        self.reporter.warn(&warning.to_string());
        result.warnings.push(warning);
    }
}

/// The `major.minor` version pinned in `.python-version`, if any.
fn python_version(directory: &Path) -> Result<Option<String>, InitError> {
    let path = directory.join(PYTHON_VERSION_FILE);
    let content = match fs_err::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if matches!(err.kind(), io::ErrorKind::NotFound | io::ErrorKind::InvalidData) => {
            return Ok(None);
        }
        Err(err) => return Err(InitError::Read { path, err }),
    };

    let Some(line) = content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
    else {
        return Ok(None);
    };
    let mut parts = line.split('.');
    let (Some(major), Some(minor)) = (parts.next(), parts.next()) else {
        return Ok(None);
    };
    let minor: String = minor.chars().take_while(char::is_ascii_digit).collect();
    if major.is_empty() || minor.is_empty() || !major.chars().all(|c| c.is_ascii_digit()) {
        return Ok(None);
    }
    Ok(Some(format!("{major}.{minor}")))
}
