//! Lifecycle hooks the host calls into.
//!
//! [`activate`] runs once when the host loads the plugin; it resolves every
//! declared connect package and wires the results into the host.
//! [`post_package_install`] runs after each package operation.

use deps_connect::{ConnectError, ConnectRegistry};
use deps_core::{
    ArchiveHandler, ArchiveKind, DownloadManager, HostIo, Link, Locker, RepositoryManager,
    RootPackage,
};
use serde::Serialize;
use std::sync::Arc;

/// Package name under which this plugin is installed into a project.
pub const PLUGIN_PACKAGE_NAME: &str = "deps-connect/connect-plugin";

/// One extension resolved during activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedExtension {
    pub key: String,
    pub constraint: String,
    pub versions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    Unavailable,
    Malformed,
}

/// One extension skipped during activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedExtension {
    pub key: String,
    pub kind: FailureKind,
    pub message: String,
}

/// Outcome of [`activate`], in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivationReport {
    pub resolved: Vec<ResolvedExtension>,
    pub failed: Vec<FailedExtension>,
}

impl ActivationReport {
    /// Whether activation returned before doing anything.
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty() && self.failed.is_empty()
    }
}

/// Resolves the root package's connect packages and registers them.
///
/// Returns immediately when the root package has no connect section.
/// Otherwise, even for an empty section, `extractor` becomes the handler for `tar` archives, each declared extension is
/// resolved in declaration order, and every success adds a synthetic
/// repository plus a requirement link from the root package. A failed
/// extension is reported through [`HostIo::write_error`] and skipped.
///
/// New links are appended to the root requirements in one update.
pub async fn activate<H>(
    host: &H,
    registry: &ConnectRegistry,
    extractor: Arc<dyn ArchiveHandler>,
) -> ActivationReport
where
    H: RepositoryManager + DownloadManager + RootPackage + HostIo,
{
    let mut report = ActivationReport::default();

    let Some(declared) = host.connect_packages() else {
        tracing::debug!("no connect packages section");
        return report;
    };

    host.set_handler(ArchiveKind::Tar, extractor);

    let root = host.name();
    let mut links = Vec::with_capacity(declared.len());

    for (key, constraint) in declared {
        match registry.resolve(&key).await {
            Ok(repository) => {
                tracing::debug!("resolved {} versions of {}", repository.len(), key);
                let versions = repository
                    .packages()
                    .iter()
                    .map(|p| p.version().to_string())
                    .collect();
                host.add_repository(repository);
                links.push(Link::new(&root, &key, &constraint));
                report.resolved.push(ResolvedExtension {
                    key,
                    constraint,
                    versions,
                });
            }
            Err(err) => {
                tracing::warn!("skipping {}: {}", key, err);
                host.write_error(&failure_message(&key, &err));
                report.failed.push(FailedExtension {
                    key,
                    kind: match err {
                        ConnectError::RegistryUnavailable { .. } => FailureKind::Unavailable,
                        ConnectError::FeedMalformed { .. } => FailureKind::Malformed,
                    },
                    message: err.to_string(),
                });
            }
        }
    }

    if !links.is_empty() {
        let mut requires = host.requires();
        requires.extend(links);
        host.set_requires(requires);
    }

    tracing::info!(
        "connect packages: {} resolved, {} failed",
        report.resolved.len(),
        report.failed.len()
    );
    report
}

fn failure_message(key: &str, err: &ConnectError) -> String {
    match err {
        ConnectError::RegistryUnavailable { .. } => format!(
            "Could not find release manifest for module with extension key: \"{key}\". \
             Did you get the casing right? Error: \"{err}\""
        ),
        ConnectError::FeedMalformed { .. } => format!(
            "Non valid XML return from connect for module with extension key: \"{key}\". {err}"
        ),
    }
}

/// A package operation the host just performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageOperation {
    Install { package: String },
    Update { package: String },
    Uninstall { package: String },
}

/// Tells the user that declared connect packages need another update run.
///
/// Only reacts to the installation of the plugin itself, outside of a
/// lock-file install, when the root package declares connect packages.
/// Returns whether the notice was written.
pub fn post_package_install<H>(host: &H, operation: &PackageOperation) -> bool
where
    H: RootPackage + Locker + HostIo,
{
    let PackageOperation::Install { package } = operation else {
        return false;
    };
    if package != PLUGIN_PACKAGE_NAME {
        return false;
    }

    let declared = host.connect_packages().unwrap_or_default();
    if declared.is_empty() || host.is_locked() {
        return false;
    }

    let keys: Vec<&str> = declared.iter().map(|(key, _)| key.as_str()).collect();
    host.write(&format!(
        "The package(s): \"{}\" will be installed the next time you run update",
        keys.join("\", \"")
    ));
    true
}
