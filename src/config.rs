//! Configuration file and on-disk layout
//!
//! ```toml
//! root = "/home/me/.catalauncher"
//! listing-uri = "http://dev.narc.ro/cataclysm/jenkins-latest/Linux_x64/Tiles/"
//! archive-pattern = '^cataclysmdda-(?P<version>[0-9]+\.[A-Z]+)-(?P<build>\d+)\.tar\.gz$'
//! archive-prefix = "cataclysmdda-"
//! extras-repo = "https://github.com/houseabsolute/cataclysm-extras-collection.git"
//! docker-image = "houseabsolute/catalauncher-player:latest"
//! ```

use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::builds::{
    BuildPattern, DEFAULT_ARCHIVE_PATTERN, DEFAULT_ARCHIVE_PREFIX, DEFAULT_LISTING_URI,
};
use crate::error::{Error, Result};

pub const DEFAULT_EXTRAS_REPO: &str =
    "https://github.com/houseabsolute/cataclysm-extras-collection.git";
pub const DEFAULT_DOCKER_IMAGE: &str = "houseabsolute/catalauncher-player:latest";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Where builds, game data and extras live; set by `setup`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    pub listing_uri: String,
    /// Regex with a `build` group (and optionally `version`) matched against archive links
    pub archive_pattern: String,
    /// Literal start of every archive name and of the game directory inside a build
    pub archive_prefix: String,
    /// Git URL of the extras collection; empty disables updating it
    pub extras_repo: String,
    pub docker_image: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: None,
            listing_uri: DEFAULT_LISTING_URI.to_string(),
            archive_pattern: DEFAULT_ARCHIVE_PATTERN.to_string(),
            archive_prefix: DEFAULT_ARCHIVE_PREFIX.to_string(),
            extras_repo: DEFAULT_EXTRAS_REPO.to_string(),
            docker_image: DEFAULT_DOCKER_IMAGE.to_string(),
        }
    }
}

impl Config {
    /// `config.toml` in the platform config directory
    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "catalauncher")
            .ok_or_else(|| Error::Config("Could not determine the config directory".into()))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load from `path`; a missing file gives the defaults
    pub fn load(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No config file at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(e) => return Err(Error::io(path, e)),
        };

        toml::from_str(&text)
            .map_err(|e| Error::Config(format!("Could not parse {:?}: {}", path, e)))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let text = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Could not serialize the config: {}", e)))?;
        fs::write(path, text).map_err(|e| Error::io(path, e))
    }

    pub fn build_pattern(&self) -> Result<BuildPattern> {
        if self.archive_pattern == DEFAULT_ARCHIVE_PATTERN
            && self.archive_prefix == DEFAULT_ARCHIVE_PREFIX
        {
            return Ok(BuildPattern::default());
        }
        BuildPattern::new(&self.archive_pattern, &self.archive_prefix)
    }

    /// Directory layout under the configured root
    pub fn layout(&self) -> Result<Layout> {
        let root = self.root.clone().ok_or_else(|| {
            Error::Config(
                "No root directory is configured; run `catalauncher setup` or pass --root".into(),
            )
        })?;
        Ok(Layout::new(root, &self.archive_prefix))
    }
}

/// Paths under the launcher root
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
    game_dir_prefix: String,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>, game_dir_prefix: &str) -> Self {
        Self {
            root: root.into(),
            game_dir_prefix: game_dir_prefix.to_string(),
        }
    }

    pub fn builds_dir(&self) -> PathBuf {
        self.root.join("builds")
    }

    pub fn build_dir(&self, build_number: u32) -> PathBuf {
        self.builds_dir().join(build_number.to_string())
    }

    /// Saves, config and graveyard, mounted into the container
    pub fn game_data_dir(&self) -> PathBuf {
        self.root.join("game-data")
    }

    pub fn extras_dir(&self) -> PathBuf {
        self.root.join("extras")
    }

    /// The directory unpacked from a build's archive, e.g. `builds/12/cataclysmdda-0.E`.
    ///
    /// Its name changes with the game version, so it is found by prefix.
    pub fn game_dir(&self, build_number: u32) -> Result<PathBuf> {
        let build_dir = self.build_dir(build_number);
        let missing = || Error::GameDirMissing {
            path: build_dir.clone(),
        };

        let entries = fs::read_dir(&build_dir).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => missing(),
            _ => Error::io(&build_dir, e),
        })?;

        let mut candidates = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&build_dir, e))?;
            let is_dir = entry
                .file_type()
                .map_err(|e| Error::io(entry.path(), e))?
                .is_dir();
            if is_dir
                && entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with(&self.game_dir_prefix)
            {
                candidates.push(entry.path());
            }
        }

        candidates.sort();
        candidates.into_iter().next().ok_or_else(missing)
    }
}

/// The user's home directory
pub fn home_dir() -> Result<PathBuf> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or_else(|| Error::Config("Could not find your home directory".into()))
}
