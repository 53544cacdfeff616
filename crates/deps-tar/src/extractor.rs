//! Strategy trait and the native-then-command-line decorator.

use crate::cli::{CliExtractor, ExtractorConfig};
use crate::error::{Result, TarError};
use crate::native::NativeExtractor;
use crate::shell::{Platform, SystemRunner};
use crate::types::ExtractionRequest;
use std::path::Path;
use std::sync::Arc;

/// One way of unpacking a tar archive into a directory.
pub trait ArchiveExtractionStrategy: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    fn extract(&self, request: &ExtractionRequest) -> Result<()>;
}

/// Tries a primary strategy and falls back to a second one on failure.
///
/// The fallback runs at most once per extraction and never after the
/// primary succeeded. When both fail the resulting
/// [`TarError::ExtractionFailed`] carries the fallback's diagnostic output
/// and the primary error as its source.
///
/// # Examples
///
/// ```no_run
/// use deps_tar::{ExtractorConfig, FallbackExtractor};
///
/// let extractor = FallbackExtractor::system(ExtractorConfig::default());
/// extractor.extract("Foo_Bar-1.0.0.tgz", "vendor/foo_bar")?;
/// # Ok::<(), deps_tar::TarError>(())
/// ```
pub struct FallbackExtractor {
    primary: Box<dyn ArchiveExtractionStrategy>,
    fallback: Box<dyn ArchiveExtractionStrategy>,
}

impl FallbackExtractor {
    pub fn new(
        primary: Box<dyn ArchiveExtractionStrategy>,
        fallback: Box<dyn ArchiveExtractionStrategy>,
    ) -> Self {
        Self { primary, fallback }
    }

    /// In-process extraction backed by the system `tar` command.
    pub fn system(config: ExtractorConfig) -> Self {
        let cli = CliExtractor::new(Arc::new(SystemRunner), Platform::current())
            .with_success_signal(config.success_signal);
        Self::new(Box::new(NativeExtractor), Box::new(cli))
    }

    /// Extracts `archive` into `destination`, sniffing its compression.
    pub fn extract(&self, archive: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<()> {
        let request = ExtractionRequest::new(archive.as_ref(), destination.as_ref());
        self.extract_request(&request)
    }

    pub fn extract_request(&self, request: &ExtractionRequest) -> Result<()> {
        tracing::debug!(
            "extracting {} into {} ({:?})",
            request.archive().display(),
            request.destination().display(),
            request.subtype()
        );

        let primary_err = match self.primary.extract(request) {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        tracing::info!(
            "{} extraction of {} failed, retrying with {}: {}",
            self.primary.name(),
            request.archive().display(),
            self.fallback.name(),
            primary_err
        );

        self.fallback.extract(request).map_err(|fallback_err| {
            tracing::warn!(
                "{} extraction of {} failed: {}",
                self.fallback.name(),
                request.archive().display(),
                fallback_err
            );
            TarError::ExtractionFailed {
                archive: request.archive().to_path_buf(),
                output: fallback_err.diagnostic_output(),
                source: Box::new(primary_err),
            }
        })
    }
}

impl std::fmt::Debug for FallbackExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackExtractor")
            .field("primary", &self.primary.name())
            .field("fallback", &self.fallback.name())
            .finish()
    }
}

impl deps_core::ArchiveHandler for FallbackExtractor {
    fn extract(&self, archive: &Path, destination: &Path) -> deps_core::Result<()> {
        Ok(Self::extract(self, archive, destination)?)
    }
}
