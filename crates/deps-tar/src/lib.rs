//! Tar archive extraction for deps-connect.
//!
//! Module archives are unpacked in-process first. When that fails, the
//! system `tar` command gets one attempt, with paths rewritten for
//! Unix-compatible shells on Windows.
//!
//! # Architecture
//!
//! - **Request**: `ExtractionRequest` sniffs gzip and bzip2 from content
//! - **Strategies**: `NativeExtractor` (tar + flate2 + bzip2) and
//!   `CliExtractor` (subprocess) behind `ArchiveExtractionStrategy`
//! - **Decorator**: `FallbackExtractor` chains them and plugs into the host
//!   as a `deps_core::ArchiveHandler`

pub mod cli;
pub mod error;
pub mod extractor;
pub mod native;
pub mod shell;
pub mod types;

// Re-export commonly used types
pub use cli::{CliExtractor, ExtractorConfig, SuccessSignal};
pub use error::{Result, TarError};
pub use extractor::{ArchiveExtractionStrategy, FallbackExtractor};
pub use native::NativeExtractor;
pub use shell::{CommandOutput, CommandRunner, Platform, SystemRunner};
pub use types::{ArchiveSubtype, ExtractionRequest};
