//! Package descriptors and the synthetic repositories that hold them.

use serde::Serialize;
use std::fmt;

/// Relative path of the module's own metadata inside an extracted archive.
pub const MODULE_MANIFEST_PATH: &str = "package.xml";

/// Package type assigned to every connect module.
pub const MODULE_PACKAGE_TYPE: &str = "magento-module";

/// Tag identifying which extraction strategy handles a downloaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveKind {
    /// Tarball, optionally gzip- or bzip2-compressed.
    Tar,
}

impl ArchiveKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tar => "tar",
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One installable version of a legacy extension.
///
/// Built once per (extension, version) pair during resolution and never
/// mutated afterwards; fields are only reachable through accessors.
///
/// # Examples
///
/// ```
/// use deps_core::{ArchiveKind, PackageDescriptor};
///
/// let descriptor = PackageDescriptor::new(
///     "Foo_Bar",
///     "1.0.0",
///     "http://example.test/community/Foo_Bar/1.0.0/Foo_Bar-1.0.0.tgz",
/// );
///
/// assert_eq!(descriptor.name(), "foo_bar");
/// assert_eq!(descriptor.archive_kind(), ArchiveKind::Tar);
/// assert_eq!(descriptor.manifest_path(), "package.xml");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDescriptor {
    name: String,
    version: String,
    dist_url: String,
    archive_kind: ArchiveKind,
    package_type: &'static str,
    manifest_path: &'static str,
}

impl PackageDescriptor {
    /// Creates a descriptor; `extension_key` is lower-cased for the name.
    pub fn new(
        extension_key: &str,
        version: impl Into<String>,
        dist_url: impl Into<String>,
    ) -> Self {
        Self {
            name: extension_key.to_lowercase(),
            version: version.into(),
            dist_url: dist_url.into(),
            archive_kind: ArchiveKind::Tar,
            package_type: MODULE_PACKAGE_TYPE,
            manifest_path: MODULE_MANIFEST_PATH,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version exactly as reported by the feed.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn dist_url(&self) -> &str {
        &self.dist_url
    }

    pub fn archive_kind(&self) -> ArchiveKind {
        self.archive_kind
    }

    pub fn package_type(&self) -> &str {
        self.package_type
    }

    pub fn manifest_path(&self) -> &str {
        self.manifest_path
    }

    /// Extra metadata handed to the host installer.
    pub fn extra(&self) -> serde_json::Value {
        serde_json::json!({ "package-xml": self.manifest_path })
    }
}

/// In-memory package index populated entirely from computed descriptors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyntheticRepository {
    packages: Vec<PackageDescriptor>,
}

impl SyntheticRepository {
    pub fn new(packages: Vec<PackageDescriptor>) -> Self {
        Self { packages }
    }

    /// Descriptors in feed order.
    pub fn packages(&self) -> &[PackageDescriptor] {
        &self.packages
    }

    /// Finds a descriptor by (case-insensitive) name and exact version.
    pub fn find(&self, name: &str, version: &str) -> Option<&PackageDescriptor> {
        let name = name.to_lowercase();
        self.packages
            .iter()
            .find(|p| p.name == name && p.version == version)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl IntoIterator for SyntheticRepository {
    type Item = PackageDescriptor;
    type IntoIter = std::vec::IntoIter<PackageDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.packages.into_iter()
    }
}

/// Version-constrained requirement edge from the root package to a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub source: String,
    pub target: String,
    /// Constraint string as declared; interpreted by the host solver.
    pub constraint: String,
}

impl Link {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            constraint: constraint.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_lowercases_name_only() {
        let d = PackageDescriptor::new("Foo_Bar", "1.0.0-Beta", "http://x/Foo_Bar");
        assert_eq!(d.name(), "foo_bar");
        assert_eq!(d.version(), "1.0.0-Beta");
        assert_eq!(d.dist_url(), "http://x/Foo_Bar");
        assert_eq!(d.package_type(), "magento-module");
    }

    #[test]
    fn test_descriptor_extra() {
        let d = PackageDescriptor::new("a", "1", "u");
        assert_eq!(d.extra()["package-xml"], "package.xml");
    }

    #[test]
    fn test_archive_kind_display() {
        assert_eq!(ArchiveKind::Tar.to_string(), "tar");
    }

    #[test]
    fn test_repository_find() {
        let repo = SyntheticRepository::new(vec![
            PackageDescriptor::new("Foo", "1.0", "u1"),
            PackageDescriptor::new("Foo", "1.1", "u2"),
        ]);

        assert_eq!(repo.len(), 2);
        assert_eq!(repo.find("FOO", "1.1").map(|d| d.dist_url()), Some("u2"));
        assert!(repo.find("foo", "2.0").is_none());
    }

    #[test]
    fn test_descriptor_serializes_kind_lowercase() {
        let d = PackageDescriptor::new("Foo", "1.0", "u");
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["archive_kind"], "tar");
        assert_eq!(json["name"], "foo");
    }
}
