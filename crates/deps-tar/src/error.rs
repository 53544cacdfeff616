//! Errors specific to archive extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Errors specific to archive extraction.
#[derive(Error, Debug)]
pub enum TarError {
    /// In-process extraction failed
    #[error("failed to extract {} in-process: {source}", .archive.display())]
    Native {
        archive: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The destination directory could not be created
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tar command could not be started
    #[error("failed to run {program} for {}: {source}", .archive.display())]
    Spawn {
        program: String,
        archive: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tar command reported a failure
    #[error("{program} failed for {}: {}", .archive.display(), describe_command_failure(.status, .output))]
    Command {
        program: String,
        archive: PathBuf,
        status: Option<i32>,
        output: String,
    },

    /// Both the in-process and the command-line strategies failed
    #[error(
        "There are errors on unpacking the archive {} by tar CLI command:\n{output}",
        .archive.display()
    )]
    ExtractionFailed {
        archive: PathBuf,
        output: String,
        #[source]
        source: Box<TarError>,
    },
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, TarError>;

fn describe_command_failure(status: &Option<i32>, output: &str) -> String {
    if !output.is_empty() {
        return output.to_string();
    }
    match status {
        Some(code) => format!("exited with status {code}"),
        None => "terminated by signal".to_string(),
    }
}

impl TarError {
    pub fn native(archive: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Native {
            archive: archive.into(),
            source,
        }
    }

    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CreateDir {
            path: path.into(),
            source,
        }
    }

    /// Diagnostic text worth showing for this failure.
    ///
    /// For a failed command this is its captured output.
    pub fn diagnostic_output(&self) -> String {
        match self {
            Self::Command { status, output, .. } => describe_command_failure(status, output),
            Self::ExtractionFailed { output, .. } => output.clone(),
            other => other.to_string(),
        }
    }
}

/// Convert to deps_core::DepsError for interoperability
impl From<TarError> for deps_core::DepsError {
    fn from(err: TarError) -> Self {
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str("\ncaused by: ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        deps_core::DepsError::Archive(message)
    }
}
