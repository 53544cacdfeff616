//! Seams into the host dependency manager.
//!
//! The host owns its repository manager, root package, download manager and
//! locker. This module names only the calls the connect plugin needs, plus
//! [`HostContext`], an in-memory host used by the CLI and by tests.

use crate::descriptor::{ArchiveKind, Link, SyntheticRepository};
use crate::error::{DepsError, Result};
use dashmap::DashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

/// Handler the host download pipeline invokes for a given archive kind.
pub trait ArchiveHandler: Send + Sync {
    /// Extracts `archive` into `destination`.
    fn extract(&self, archive: &Path, destination: &Path) -> Result<()>;
}

/// Adds package repositories to the host's index.
pub trait RepositoryManager: Send + Sync {
    fn add_repository(&self, repository: SyntheticRepository);
}

/// Registers archive handlers by kind.
pub trait DownloadManager: Send + Sync {
    fn set_handler(&self, kind: ArchiveKind, handler: Arc<dyn ArchiveHandler>);
}

/// The project being installed.
pub trait RootPackage: Send + Sync {
    fn name(&self) -> String;

    /// Declared `extension key -> constraint` pairs, in declaration order.
    ///
    /// `None` when the root package has no connect section at all, which is
    /// distinct from a declared but empty one.
    fn connect_packages(&self) -> Option<Vec<(String, String)>>;

    fn requires(&self) -> Vec<Link>;

    fn set_requires(&self, links: Vec<Link>);
}

/// Lock-file state of the host.
pub trait Locker: Send + Sync {
    fn is_locked(&self) -> bool;
}

/// User-visible output channel of the host.
pub trait HostIo: Send + Sync {
    fn write(&self, message: &str);

    fn write_error(&self, message: &str);
}

/// In-memory host implementing every seam.
///
/// # Examples
///
/// ```
/// use deps_core::{HostContext, RootPackage};
///
/// let host = HostContext::new("acme/shop")
///     .with_connect_package("Foo_Bar", "1.0.*");
///
/// assert_eq!(host.name(), "acme/shop");
/// assert_eq!(host.connect_packages().map(|p| p.len()), Some(1));
/// assert!(HostContext::new("acme/shop").connect_packages().is_none());
/// ```
#[derive(Default)]
pub struct HostContext {
    name: String,
    connect_packages: Option<Vec<(String, String)>>,
    locked: bool,
    requires: Mutex<Vec<Link>>,
    repositories: Mutex<Vec<SyntheticRepository>>,
    handlers: DashMap<ArchiveKind, Arc<dyn ArchiveHandler>>,
    output: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl HostContext {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_connect_package(
        mut self,
        key: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        self.connect_packages
            .get_or_insert_with(Vec::new)
            .push((key.into(), constraint.into()));
        self
    }

    /// Declares the connect section, even when `packages` is empty.
    #[must_use]
    pub fn with_connect_packages(mut self, packages: Vec<(String, String)>) -> Self {
        self.connect_packages
            .get_or_insert_with(Vec::new)
            .extend(packages);
        self
    }

    #[must_use]
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn repositories(&self) -> Vec<SyntheticRepository> {
        self.repositories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn handler(&self, kind: ArchiveKind) -> Option<Arc<dyn ArchiveHandler>> {
        self.handlers.get(&kind).map(|h| Arc::clone(h.value()))
    }

    /// Runs the handler registered for `kind`.
    pub fn extract(&self, kind: ArchiveKind, archive: &Path, destination: &Path) -> Result<()> {
        let handler = self
            .handler(kind)
            .ok_or_else(|| DepsError::UnknownArchiveKind(kind.to_string()))?;
        handler.extract(archive, destination)
    }

    pub fn output(&self) -> Vec<String> {
        self.output
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RepositoryManager for HostContext {
    fn add_repository(&self, repository: SyntheticRepository) {
        self.repositories
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(repository);
    }
}

impl DownloadManager for HostContext {
    fn set_handler(&self, kind: ArchiveKind, handler: Arc<dyn ArchiveHandler>) {
        self.handlers.insert(kind, handler);
    }
}

impl RootPackage for HostContext {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn connect_packages(&self) -> Option<Vec<(String, String)>> {
        self.connect_packages.clone()
    }

    fn requires(&self) -> Vec<Link> {
        self.requires
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_requires(&self, links: Vec<Link>) {
        *self.requires.lock().unwrap_or_else(PoisonError::into_inner) = links;
    }
}

impl Locker for HostContext {
    fn is_locked(&self) -> bool {
        self.locked
    }
}

impl HostIo for HostContext {
    fn write(&self, message: &str) {
        self.output
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }

    fn write_error(&self, message: &str) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}
