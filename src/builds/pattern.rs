//! Recognizing build archives in a listing page
//!
//! The listing site has renamed its archives more than once, so the filename convention lives
//! in a [`BuildPattern`] value rather than in the parser. The built-in convention is
//! [`DEFAULT_PATTERN`]; `archive-pattern` in the config file swaps it out.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

/// Archive filenames of the form `cataclysmdda-0.E-12345.tar.gz`.
pub const DEFAULT_ARCHIVE_PATTERN: &str =
    r"^cataclysmdda-(?P<version>[0-9]+\.[A-Z]+)-(?P<build>\d+)\.tar\.gz$";

/// Literal prefix shared by every archive name and by the directory unpacked from it.
pub const DEFAULT_ARCHIVE_PREFIX: &str = "cataclysmdda-";

pub static DEFAULT_PATTERN: Lazy<BuildPattern> = Lazy::new(|| {
    BuildPattern::new(DEFAULT_ARCHIVE_PATTERN, DEFAULT_ARCHIVE_PREFIX)
        .expect("built-in archive pattern is valid")
});

/// Compiled pair of patterns used to read one listing format
#[derive(Debug, Clone)]
pub struct BuildPattern {
    archive: Regex,
    dated_line: Regex,
    prefix: String,
}

/// Pieces captured from a matching archive filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMatch<'a> {
    pub version: &'a str,
    pub build: &'a str,
}

impl BuildPattern {
    /// Compile `archive` (must have a `build` group, `version` is optional).
    ///
    /// The listing text is searched with the same pattern minus its `^`/`$` anchors, so the
    /// upload times follow whatever extension or naming `archive` describes. `prefix` names the
    /// directory each archive unpacks to.
    pub fn new(archive: &str, prefix: &str) -> Result<Self> {
        let archive = Regex::new(archive)
            .map_err(|e| Error::Config(format!("Invalid archive pattern: {}", e)))?;

        if !archive.capture_names().any(|name| name == Some("build")) {
            return Err(Error::Config(format!(
                "The archive pattern {} has no (?P<build>...) group",
                archive.as_str()
            )));
        }

        let inner = unanchored(archive.as_str())?;
        let dated_line = Regex::new(&format!(
            r"(?P<listed_name>{})\s+(?P<listed_at>\d{{4}}-\d{{2}}-\d{{2}} \d{{2}}:\d{{2}})",
            inner
        ))
        .map_err(|e| {
            Error::Config(format!(
                "The archive pattern {} cannot be used to find upload times: {}",
                archive.as_str(),
                e
            ))
        })?;

        Ok(Self {
            archive,
            dated_line,
            prefix: prefix.to_string(),
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Test a link target against the archive pattern
    pub fn match_archive<'a>(&self, href: &'a str) -> Option<ArchiveMatch<'a>> {
        let caps = self.archive.captures(href)?;
        let build = caps.name("build")?.as_str();
        let version = caps.name("version").map(|m| m.as_str()).unwrap_or("");
        Some(ArchiveMatch { version, build })
    }

    /// Find `<filename> <YYYY-MM-DD HH:MM>` pairs in free text
    pub fn dated_entries<'t>(&self, text: &'t str) -> Vec<(&'t str, &'t str)> {
        self.dated_line
            .captures_iter(text)
            .filter_map(|caps| {
                let name = caps.name("listed_name")?.as_str();
                let stamp = caps.name("listed_at")?.as_str();
                Some((name, stamp))
            })
            .collect()
    }
}

/// Strip the outer anchors from `pattern` so it can match inside a line of text.
///
/// Anchors anywhere else would stop the pattern from ever matching mid-line.
fn unanchored(pattern: &str) -> Result<&str> {
    let mut inner = pattern
        .strip_prefix('^')
        .or_else(|| pattern.strip_prefix(r"\A"))
        .unwrap_or(pattern);
    if let Some(rest) = inner.strip_suffix('$').filter(|rest| !ends_escaped(rest)) {
        inner = rest;
    } else if let Some(rest) = inner.strip_suffix(r"\z").filter(|rest| !ends_escaped(rest)) {
        inner = rest;
    }

    let mut escaped = false;
    let mut in_class = false;
    for c in inner.chars() {
        if escaped {
            escaped = false;
            if !in_class && matches!(c, 'A' | 'z') {
                return Err(anchored_inside(pattern));
            }
            continue;
        }
        match c {
            '\\' => escaped = true,
            '[' => in_class = true,
            ']' => in_class = false,
            '^' | '$' if !in_class => return Err(anchored_inside(pattern)),
            _ => {}
        }
    }
    Ok(inner)
}

/// Whether the text ends in an odd number of backslashes
fn ends_escaped(text: &str) -> bool {
    text.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn anchored_inside(pattern: &str) -> Error {
    Error::Config(format!(
        "The archive pattern {} is anchored inside and can never match a dated listing line",
        pattern
    ))
}

impl Default for BuildPattern {
    fn default() -> Self {
        DEFAULT_PATTERN.clone()
    }
}
