//! Connect registry support for deps-connect.
//!
//! This crate turns a legacy connect registry's per-extension XML release
//! feed into a synthetic package repository: one [`PackageDescriptor`] per
//! listed release, each with a deterministic tarball URL.
//!
//! # Architecture
//!
//! - **Feed**: well-formedness checking and release extraction (`quick-xml`)
//! - **Registry**: feed/dist URL templates and the `ConnectRegistry` client
//! - **Error Handling**: `RegistryUnavailable` and `FeedMalformed`, both
//!   recoverable per extension key
//!
//! # Examples
//!
//! ```no_run
//! use deps_connect::ConnectRegistry;
//! use deps_core::HttpFetcher;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let registry = ConnectRegistry::with_bases(
//!     Arc::new(HttpFetcher::new().unwrap()),
//!     "http://example.test/community",
//!     "http://example.test/community",
//! );
//!
//! let versions = registry.resolve_versions("Foo_Bar").await.unwrap();
//! let repository = registry.build_descriptors("Foo_Bar", &versions);
//! assert_eq!(repository.len(), versions.len());
//! # }
//! ```
//!
//! [`PackageDescriptor`]: deps_core::PackageDescriptor

pub mod error;
pub mod feed;
pub mod registry;

// Re-export commonly used types
pub use error::{ConnectError, Result, Unavailable};
pub use feed::RegistryFeed;
pub use registry::{COMMUNITY_BASE, ConnectRegistry, dist_url, releases_url};
