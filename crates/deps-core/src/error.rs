use thiserror::Error;

/// Core error types for deps-connect.
///
/// Ecosystem crates (`deps-connect`, `deps-tar`) define their own richer
/// errors and convert into this type at the host boundary.
///
/// # Examples
///
/// ```
/// use deps_core::error::{DepsError, Result};
///
/// fn fetch(url: &str) -> Result<()> {
///     if url.is_empty() {
///         return Err(DepsError::InvalidUrl("empty".into()));
///     }
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum DepsError {
    #[error("request failed for {url}: {source}")]
    RequestError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("registry error: {0}")]
    Registry(String),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("no extractor registered for archive kind '{0}'")]
    UnknownArchiveKind(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for `Result<T, DepsError>`.
pub type Result<T> = std::result::Result<T, DepsError>;
