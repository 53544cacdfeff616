//! Extraction through the system `tar` command.

use crate::error::{Result, TarError};
use crate::extractor::ArchiveExtractionStrategy;
use crate::shell::{CommandRunner, Platform, is_unix_shell, to_unix_shell_path};
use crate::types::{ArchiveSubtype, ExtractionRequest};
use serde::Deserialize;
use std::ffi::OsString;
use std::fs::DirBuilder;
use std::path::Path;
use std::sync::Arc;

/// How a finished `tar` run is judged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuccessSignal {
    /// The exit status decides; output of a successful run is only logged.
    #[default]
    ExitStatus,
    /// Any output at all is a failure, whatever the exit status.
    SilentOutput,
}

impl std::str::FromStr for SuccessSignal {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "exit-status" => Ok(Self::ExitStatus),
            "silent-output" => Ok(Self::SilentOutput),
            other => Err(format!(
                "unknown success signal '{other}', expected 'exit-status' or 'silent-output'"
            )),
        }
    }
}

/// Extraction settings read from the `extra.connect-tar` manifest section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ExtractorConfig {
    pub success_signal: SuccessSignal,
}

/// Runs `tar -x` as a subprocess.
pub struct CliExtractor {
    runner: Arc<dyn CommandRunner>,
    platform: Platform,
    success_signal: SuccessSignal,
    program: String,
}

impl CliExtractor {
    pub fn new(runner: Arc<dyn CommandRunner>, platform: Platform) -> Self {
        Self {
            runner,
            platform,
            success_signal: SuccessSignal::default(),
            program: "tar".to_string(),
        }
    }

    #[must_use]
    pub fn with_success_signal(mut self, signal: SuccessSignal) -> Self {
        self.success_signal = signal;
        self
    }

    /// Overrides the executable, `tar` by default.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn success_signal(&self) -> SuccessSignal {
        self.success_signal
    }

    /// Command-line arguments for one extraction.
    ///
    /// Gzip is selected when either the content or the file name says so.
    pub fn arguments(&self, request: &ExtractionRequest) -> Vec<OsString> {
        let flag = match request.subtype() {
            ArchiveSubtype::Gzip => "-xzf",
            _ if request.has_gzip_extension() => "-xzf",
            ArchiveSubtype::Bzip2 => "-xjf",
            ArchiveSubtype::Plain => "-xf",
        };

        let (archive, destination) =
            if self.platform == Platform::Windows && is_unix_shell(&*self.runner, self.platform) {
                (
                    OsString::from(to_unix_shell_path(&request.archive().to_string_lossy())),
                    OsString::from(to_unix_shell_path(&request.destination().to_string_lossy())),
                )
            } else {
                (
                    request.archive().as_os_str().to_os_string(),
                    request.destination().as_os_str().to_os_string(),
                )
            };

        vec![
            OsString::from(flag),
            archive,
            OsString::from("-C"),
            destination,
        ]
    }
}

impl std::fmt::Debug for CliExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliExtractor")
            .field("platform", &self.platform)
            .field("success_signal", &self.success_signal)
            .field("program", &self.program)
            .finish_non_exhaustive()
    }
}

fn create_destination(path: &Path) -> std::io::Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o777);
    }
    builder.create(path)
}

impl ArchiveExtractionStrategy for CliExtractor {
    fn name(&self) -> &'static str {
        "tar-cli"
    }

    fn extract(&self, request: &ExtractionRequest) -> Result<()> {
        create_destination(request.destination())
            .map_err(|e| TarError::create_dir(request.destination(), e))?;

        let args = self.arguments(request);
        let output = self
            .runner
            .run(&self.program, &args)
            .map_err(|source| TarError::Spawn {
                program: self.program.clone(),
                archive: request.archive().to_path_buf(),
                source,
            })?;

        let failed = match self.success_signal {
            SuccessSignal::ExitStatus => !output.success,
            SuccessSignal::SilentOutput => !output.combined.is_empty(),
        };

        if failed {
            return Err(TarError::Command {
                program: self.program.clone(),
                archive: request.archive().to_path_buf(),
                status: output.status,
                output: output.combined,
            });
        }

        if !output.combined.trim().is_empty() {
            tracing::warn!(
                "{} reported output while extracting {}: {}",
                self.program,
                request.archive().display(),
                output.combined.trim()
            );
        }
        Ok(())
    }
}
