use std::io;

use console::Term;
use dialoguer::Select;

use crate::project::package_manager::PackageManagerKind;

/// Asks the user to pick a package manager.
pub trait InteractivePrompt {
    /// Returns `None` if the user declined or no terminal is attached.
    fn select(&self, candidates: &[PackageManagerKind]) -> io::Result<Option<PackageManagerKind>>;
}

/// Arrow-key menu on the standard error terminal.
#[derive(Debug, Clone)]
pub struct TerminalPrompt {
    term: Term,
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self {
            term: Term::stderr(),
        }
    }
}

impl InteractivePrompt for TerminalPrompt {
    fn select(&self, candidates: &[PackageManagerKind]) -> io::Result<Option<PackageManagerKind>> {
        if candidates.is_empty() || !self.term.is_term() {
            return Ok(None);
        }

        let index = Select::new()
            .with_prompt("Which package manager should this project use?")
            .items(candidates)
            .default(0)
            .interact_on_opt(&self.term)
            .map_err(io::Error::other)?;
        Ok(index.and_then(|index| candidates.get(index).copied()))
    }
}
