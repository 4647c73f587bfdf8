use std::io;
use std::path::{Path, PathBuf};

use crate::project::migrate::MigrationError;

/// The project directory (or one of its markers) could not be inspected.
///
/// Always fatal: an unreadable directory must never be reported as an empty one.
#[derive(Debug, thiserror::Error)]
#[error("failed to inspect `{}`", path.display())]
pub struct DetectionError {
    path: PathBuf,
    #[source]
    err: io::Error,
}

impl DetectionError {
    pub(crate) fn new(path: impl Into<PathBuf>, err: io::Error) -> Self {
        Self {
            path: path.into(),
            err,
        }
    }

    /// The path that could not be inspected.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A fatal failure of `ultrapyup init`.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error(transparent)]
    Detection(#[from] DetectionError),

    #[error(transparent)]
    Migration(#[from] MigrationError),

    #[error("failed to read `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    #[error("failed to write `{}`", path.display())]
    Write {
        path: PathBuf,
        #[source]
        err: io::Error,
    },
}
