use once_cell::unsync::OnceCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};

/// Builds already unpacked under the builds directory
///
/// The directory is scanned once per instance; call [`LocalBuilds::refresh`] (or make a new
/// instance) to see builds installed afterwards.
pub struct LocalBuilds {
    builds_dir: PathBuf,
    cache: OnceCell<Vec<u32>>,
}

impl LocalBuilds {
    pub fn new(builds_dir: impl Into<PathBuf>) -> Self {
        Self {
            builds_dir: builds_dir.into(),
            cache: OnceCell::new(),
        }
    }

    /// Get path to build-specific directory
    pub fn build_dir(&self, build_number: u32) -> PathBuf {
        self.builds_dir.join(build_number.to_string())
    }

    /// All local build numbers, ascending
    pub fn all(&self) -> Result<&[u32]> {
        self.cache
            .get_or_try_init(|| scan(&self.builds_dir))
            .map(Vec::as_slice)
    }

    /// The highest local build number, if any
    pub fn latest(&self) -> Result<Option<u32>> {
        Ok(self.all()?.last().copied())
    }

    /// Check if a build is already unpacked
    pub fn has_build(&self, build_number: u32) -> Result<bool> {
        Ok(self.all()?.binary_search(&build_number).is_ok())
    }

    /// Forget the cached scan
    pub fn refresh(&mut self) {
        self.cache = OnceCell::new();
    }
}

fn scan(builds_dir: &Path) -> Result<Vec<u32>> {
    let scan_error = |source: io::Error| Error::LocalBuilds {
        path: builds_dir.to_path_buf(),
        source,
    };

    let entries = match fs::read_dir(builds_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No builds directory at {:?} yet", builds_dir);
            return Ok(Vec::new());
        }
        Err(e) => return Err(scan_error(e)),
    };

    let mut builds = Vec::new();
    for entry in entries {
        let entry = entry.map_err(scan_error)?;
        if !entry.file_type().map_err(scan_error)?.is_dir() {
            continue;
        }

        if let Some(number) = entry.file_name().to_str().and_then(parse_build_number) {
            builds.push(number);
        }
    }

    builds.sort_unstable();
    Ok(builds)
}

/// Accept only canonical positive decimals: `12` but not `012`, `0`, `+12` or `abc`.
fn parse_build_number(name: &str) -> Option<u32> {
    let mut chars = name.chars();
    let first = chars.next()?;
    if !('1'..='9').contains(&first) || !chars.all(|c| c.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}
