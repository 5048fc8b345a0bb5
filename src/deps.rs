use std::env;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use parser::{Cli, InputFormat, OutputFormat};

pub const SAMTOOLS: &str = "samtools";
pub const SORT_BED: &str = "sort-bed";
pub const STARCH: &str = "starch";

#[derive(Error, Debug)]
pub enum DepsError {
    #[error("Cannot find the '{0}' binary required for this conversion. Ensure it is installed and reachable through PATH")]
    Missing(&'static str),
}

/// Resolved paths of the helper binaries the requested conversion relies on.
///
/// Discovery happens once at startup, before any pipe opens: a missing helper
/// must abort the run while stdout is still untouched.
#[derive(Debug, Default)]
pub struct Helpers {
    pub samtools: Option<PathBuf>,
    pub sort_bed: Option<PathBuf>,
    pub starch: Option<PathBuf>,
}

impl Helpers {
    /// Locate every helper the requested conversion needs.
    ///
    /// # Errors
    /// Returns `DepsError::Missing` naming the first helper that could not be
    /// resolved: samtools for BAM input, sort-bed unless sorting is disabled,
    /// starch for Starch output.
    pub fn discover(cli: &Cli) -> Result<Self, DepsError> {
        let mut helpers = Self::default();
        if cli.input == InputFormat::Bam {
            helpers.samtools = Some(find_in_path(SAMTOOLS).ok_or(DepsError::Missing(SAMTOOLS))?);
        }
        if cli.sort_requested() {
            helpers.sort_bed = Some(find_in_path(SORT_BED).ok_or(DepsError::Missing(SORT_BED))?);
        }
        if cli.output == OutputFormat::Starch {
            helpers.starch = Some(find_in_path(STARCH).ok_or(DepsError::Missing(STARCH))?);
        }
        Ok(helpers)
    }
}

/// Walk the PATH environment variable for `name`.
///
/// An empty PATH segment stands for the current directory. A name already
/// containing a path separator bypasses the walk and is checked directly.
#[must_use]
pub fn find_in_path(name: &str) -> Option<PathBuf> {
    if name.contains('/') {
        let candidate = PathBuf::from(name);
        return is_executable(&candidate).then_some(candidate)
    }
    for dir in env::split_paths(&env::var_os("PATH")?) {
        let dir = if dir.as_os_str().is_empty() { PathBuf::from(".") } else { dir };
        let candidate = dir.join(name);
        if is_executable(&candidate) {
            debug!("Found dependency [{}]", candidate.display());
            return Some(candidate)
        }
    }
    None
}

/// A candidate qualifies if it exists, is a regular file, and carries an
/// execute permission bit.
fn is_executable(candidate: &Path) -> bool {
    candidate
        .metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}
