//! Filesystem predicates used by project detection.
//!
//! Every check distinguishes "absent" from "could not look": a missing path is
//! `Ok(false)`, while permission and other I/O failures are returned as errors
//! so that callers never mistake an unreadable directory for an empty one.

use std::io;
use std::path::Path;

use toml_edit::{DocumentMut, Item, TableLike};
use tracing::debug;

/// Returns `true` if `path` exists and is a regular file (symlinks are followed).
pub(crate) fn is_file(path: &Path) -> io::Result<bool> {
    match fs_err::metadata(path) {
        Ok(metadata) => Ok(metadata.is_file()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Returns `true` if `path` exists and is a directory (symlinks are followed).
pub(crate) fn is_dir(path: &Path) -> io::Result<bool> {
    match fs_err::metadata(path) {
        Ok(metadata) => Ok(metadata.is_dir()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Read the TOML document at `path`.
///
/// A missing file is `Ok(None)`, and so is content that is not valid TOML:
/// detection only asks which tables exist, and a broken file holds none.
/// Invalid UTF-8 is read lossily.
pub(crate) fn read_toml(path: &Path) -> io::Result<Option<DocumentMut>> {
    let bytes = match fs_err::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err),
    };
    match String::from_utf8_lossy(&bytes).parse::<DocumentMut>() {
        Ok(document) => Ok(Some(document)),
        Err(err) => {
            debug!("Ignoring invalid TOML in `{}`: {}", path.display(), err.message());
            Ok(None)
        }
    }
}

/// Returns `true` if the dotted `key` (e.g. `tool.uv`) names a table in `document`.
///
/// Standard tables, inline tables and implicit tables created by dotted keys
/// all count; keys are matched exactly, never by prefix.
pub(crate) fn has_table(document: &DocumentMut, key: &str) -> bool {
    let mut table: &dyn TableLike = document.as_table();
    for part in key.split('.') {
        match table.get(part).and_then(Item::as_table_like) {
            Some(next) => table = next,
            None => return false,
        }
    }
    true
}

/// Ensure `directory` can be listed.
pub(crate) fn ensure_readable_dir(directory: &Path) -> io::Result<()> {
    fs_err::read_dir(directory).map(drop)
}
