//! Errors raised by the host integration layer and the command-line tool.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the host integration layer.
///
/// Per-extension resolution failures are reported through the host and
/// never surface here; these variants end the whole operation.
#[derive(Error, Debug)]
pub enum PluginError {
    /// The manifest file could not be read
    #[error("failed to read manifest {}: {source}", .path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest file is not valid JSON or has the wrong shape
    #[error("failed to parse manifest {}: {source}", .path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Connect(#[from] deps_connect::ConnectError),

    #[error(transparent)]
    Tar(#[from] deps_tar::TarError),

    #[error(transparent)]
    Core(#[from] deps_core::DepsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;

impl PluginError {
    pub fn manifest_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ManifestRead {
            path: path.into(),
            source,
        }
    }

    pub fn manifest_parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::ManifestParse {
            path: path.into(),
            source,
        }
    }
}

/// Convert to deps_core::DepsError for interoperability
impl From<PluginError> for deps_core::DepsError {
    fn from(err: PluginError) -> Self {
        match err {
            PluginError::Core(e) => e,
            PluginError::Connect(e) => e.into(),
            PluginError::Tar(e) => e.into(),
            PluginError::Json(e) => Self::Json(e),
            other => Self::Registry(other.to_string()),
        }
    }
}
