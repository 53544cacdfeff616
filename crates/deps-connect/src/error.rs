//! Errors specific to connect registry resolution.
//!
//! Both variants are recoverable per extension: a failure for one key must
//! not stop resolution of the others.

use std::fmt;
use thiserror::Error;

/// Why a release feed could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// The registry answered with a status other than 200.
    Status(u16),
    /// The registry answered, but with nothing in the body.
    EmptyBody,
    /// No response was obtained at all.
    Transport(String),
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => write!(f, "did not return a 200 response (got {status})"),
            Self::EmptyBody => f.write_str("returned nothing"),
            Self::Transport(message) => write!(f, "could not be fetched: {message}"),
        }
    }
}

/// Errors specific to connect registry resolution.
#[derive(Error, Debug)]
pub enum ConnectError {
    /// Release feed missing, unreachable, or empty
    #[error("release feed for '{extension}' unavailable: URL \"{url}\" {reason}")]
    RegistryUnavailable {
        extension: String,
        url: String,
        reason: Unavailable,
    },

    /// Release feed is not well-formed XML
    #[error(
        "XML parsing failed for '{extension}'. URL: \"{url}\", Errors: \"{}\"",
        .diagnostics.join("', '")
    )]
    FeedMalformed {
        extension: String,
        url: String,
        diagnostics: Vec<String>,
    },
}

/// Result type alias for connect registry operations.
pub type Result<T> = std::result::Result<T, ConnectError>;

impl ConnectError {
    /// Create a registry unavailable error.
    pub fn unavailable(
        extension: impl Into<String>,
        url: impl Into<String>,
        reason: Unavailable,
    ) -> Self {
        Self::RegistryUnavailable {
            extension: extension.into(),
            url: url.into(),
            reason,
        }
    }

    /// Create a malformed feed error from collected parser diagnostics.
    pub fn malformed(
        extension: impl Into<String>,
        url: impl Into<String>,
        diagnostics: Vec<String>,
    ) -> Self {
        Self::FeedMalformed {
            extension: extension.into(),
            url: url.into(),
            diagnostics,
        }
    }

    /// Extension key the error belongs to.
    pub fn extension(&self) -> &str {
        match self {
            Self::RegistryUnavailable { extension, .. } | Self::FeedMalformed { extension, .. } => {
                extension
            }
        }
    }

    /// Feed URL the error belongs to.
    pub fn url(&self) -> &str {
        match self {
            Self::RegistryUnavailable { url, .. } | Self::FeedMalformed { url, .. } => url,
        }
    }
}

/// Convert to deps_core::DepsError for interoperability
impl From<ConnectError> for deps_core::DepsError {
    fn from(err: ConnectError) -> Self {
        deps_core::DepsError::Registry(err.to_string())
    }
}
