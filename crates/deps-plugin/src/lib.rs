//! Host integration for connect registry modules.
//!
//! Wires the registry resolver (`deps-connect`) and the archive extractor
//! (`deps-tar`) into a host dependency manager through the seams defined in
//! `deps-core`.
//!
//! # Examples
//!
//! ```no_run
//! use deps_plugin::{Manifest, activate};
//! use deps_tar::FallbackExtractor;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> deps_plugin::Result<()> {
//! let manifest = Manifest::load(Path::new("composer.json"))?;
//! let host = manifest.host();
//! let registry = manifest.connect_config().registry()?;
//! let extractor = Arc::new(FallbackExtractor::system(manifest.extractor_config()));
//!
//! let report = activate(&host, &registry, extractor).await;
//! println!("{} resolved", report.resolved.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod plugin;

// Re-export commonly used types
pub use config::{ConnectConfig, HttpConfig, Manifest};
pub use error::{PluginError, Result};
pub use plugin::{
    ActivationReport, FailedExtension, FailureKind, PLUGIN_PACKAGE_NAME, PackageOperation,
    ResolvedExtension, activate, post_package_install,
};
