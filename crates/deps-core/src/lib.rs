//! Core abstractions for deps-connect.
//!
//! This crate provides the types shared by the connect registry resolver,
//! the tar extractor, and the host integration layer.
//!
//! # Architecture
//!
//! deps-core defines:
//! - **Descriptors**: `PackageDescriptor`, `SyntheticRepository`, `Link`
//! - **Fetching**: the `FeedFetcher` transport seam with HTTP and file backends
//! - **Host seams**: `RepositoryManager`, `DownloadManager`, `RootPackage`,
//!   `Locker`, `HostIo`, `ArchiveHandler`, and the in-memory `HostContext`
//! - **Error Types**: `DepsError` shared at the host boundary
//!
//! # Examples
//!
//! Registering a synthetic repository with a host:
//!
//! ```
//! use deps_core::{HostContext, PackageDescriptor, RepositoryManager, SyntheticRepository};
//!
//! let host = HostContext::new("acme/shop");
//! let repository = SyntheticRepository::new(vec![PackageDescriptor::new(
//!     "Foo_Bar",
//!     "1.0.0",
//!     "http://example.test/community/Foo_Bar/1.0.0/Foo_Bar-1.0.0.tgz",
//! )]);
//!
//! host.add_repository(repository);
//! assert_eq!(host.repositories().len(), 1);
//! ```

pub mod descriptor;
pub mod error;
pub mod fetch;
pub mod host;

// Re-export commonly used types
pub use descriptor::{
    ArchiveKind, Link, MODULE_MANIFEST_PATH, MODULE_PACKAGE_TYPE, PackageDescriptor,
    SyntheticRepository,
};
pub use error::{DepsError, Result};
pub use fetch::{FeedClient, FeedFetcher, FetchResponse, FileFetcher, HttpFetcher};
pub use host::{
    ArchiveHandler, DownloadManager, HostContext, HostIo, Locker, RepositoryManager, RootPackage,
};
