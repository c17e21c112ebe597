//! Error types for resolving, fetching and installing builds

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for launcher operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while managing builds
#[derive(Debug, Error)]
pub enum Error {
    #[error("Could not create the HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Could not fetch {uri}: {reason}")]
    Fetch { uri: String, reason: String },

    #[error("Could not parse the build listing: {0}")]
    Parse(String),

    #[error("Could not find the build you requested, #{build}, in the list of available builds")]
    BuildNotFound { build: u32 },

    #[error("No builds were found at {uri}")]
    NoBuilds { uri: String },

    #[error("Could not download {uri}: {reason}")]
    Download { uri: String, reason: String },

    #[error("Could not extract {archive:?} into {target:?}: {output}")]
    Extract {
        archive: PathBuf,
        target: PathBuf,
        output: String,
    },

    #[error("Could not copy {from:?} to {to:?}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not read the builds directory at {path:?}: {source}")]
    LocalBuilds {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not find a game directory in {path:?}")]
    GameDirMissing { path: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not run \"{command}\": {output}")]
    Command { command: String, output: String },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
