//! Common test utilities for integration tests.
//!
//! Fixture builders for release feeds, module tarballs and manifests.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Release feed listing the given versions, one `<r>` per version.
pub(crate) fn releases_xml(versions: &[&str]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\"?>\n<releases>\n");
    for version in versions {
        xml.push_str(&format!(
            "  <r><v>{version}</v><s>stable</s><d>2014-05-01</d></r>\n"
        ));
    }
    xml.push_str("</releases>\n");
    xml
}

/// Writes a gzip-compressed module tarball containing a `package.xml`.
pub(crate) fn write_module_tgz(path: &Path, extension_key: &str) {
    let manifest = format!("<package><name>{extension_key}</name></package>");
    let mut builder = tar::Builder::new(Vec::new());
    for (name, content) in [
        ("package.xml", manifest.as_str()),
        ("app/etc/modules/module.xml", "<config/>"),
    ] {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, content.as_bytes())
            .expect("Failed to append tar entry");
    }

    let tar_bytes = builder.into_inner().expect("Failed to finish tar");
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&tar_bytes).expect("Failed to compress");
    std::fs::write(path, encoder.finish().expect("Failed to finish gzip"))
        .expect("Failed to write tarball");
}

/// Writes a JSON manifest into `dir` and returns its path.
#[allow(dead_code)] // Used in cli tests, not all tests
pub(crate) fn write_manifest(dir: &Path, manifest: &serde_json::Value) -> PathBuf {
    let path = dir.join("composer.json");
    std::fs::write(
        &path,
        serde_json::to_string_pretty(manifest).expect("Failed to serialize manifest"),
    )
    .expect("Failed to write manifest");
    path
}

/// Lays out a `file://` feed tree: `<root>/<key>/releases.xml`.
#[allow(dead_code)] // Used in cli tests, not all tests
pub(crate) fn write_feed(root: &Path, extension_key: &str, xml: &str) {
    let dir = root.join(extension_key);
    std::fs::create_dir_all(&dir).expect("Failed to create feed dir");
    std::fs::write(dir.join("releases.xml"), xml).expect("Failed to write feed");
}

/// `file://` URL for a local directory.
#[allow(dead_code)] // Used in cli tests, not all tests
pub(crate) fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}
