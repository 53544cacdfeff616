//! Integration tests for plugin activation against a mocked registry.
//!
//! These tests run the full path: manifest -> config -> HTTP registry ->
//! host registration -> tar handler extraction.

mod common;

use common::{releases_xml, write_module_tgz};
use deps_core::{ArchiveKind, HostContext, Link, RootPackage};
use deps_plugin::{FailureKind, Manifest, activate};
use deps_tar::FallbackExtractor;
use serde_json::json;
use std::sync::Arc;

/// Builds a manifest from text so that package declaration order survives.
fn manifest_for(server_url: &str, packages: &str) -> Manifest {
    let text = format!(
        r#"{{
            "name": "acme/shop",
            "require": {{ "acme/theme": "^2.0" }},
            "extra": {{
                "connect-packages": {packages},
                "connect": {{
                    "feed-base": "{server_url}/community",
                    "dist-base": "http://example.test/community",
                    "http": {{ "timeout-secs": 5 }}
                }}
            }}
        }}"#
    );
    serde_json::from_str(&text).unwrap()
}

async fn run_activation(manifest: &Manifest) -> (HostContext, deps_plugin::ActivationReport) {
    let host = manifest.host();
    let registry = manifest.connect_config().registry().unwrap();
    let extractor = Arc::new(FallbackExtractor::system(manifest.extractor_config()));
    let report = activate(&host, &registry, extractor).await;
    (host, report)
}

#[tokio::test]
async fn test_end_to_end_resolution() {
    let mut server = mockito::Server::new_async().await;
    let feed = server
        .mock("GET", "/community/Foo_Bar/releases.xml")
        .with_status(200)
        .with_header("content-type", "application/xml")
        .with_body(releases_xml(&["1.0.0", "1.0.1"]))
        .expect(1)
        .create_async()
        .await;

    let manifest = manifest_for(&server.url(), r#"{ "Foo_Bar": "1.0.*" }"#);
    let (host, report) = run_activation(&manifest).await;

    feed.assert_async().await;
    assert_eq!(report.resolved.len(), 1);
    assert!(report.failed.is_empty());

    let repositories = host.repositories();
    assert_eq!(repositories.len(), 1);
    let urls: Vec<_> = repositories[0]
        .packages()
        .iter()
        .map(|p| p.dist_url().to_string())
        .collect();
    assert_eq!(
        urls,
        [
            "http://example.test/community/Foo_Bar/1.0.0/Foo_Bar-1.0.0.tgz",
            "http://example.test/community/Foo_Bar/1.0.1/Foo_Bar-1.0.1.tgz",
        ]
    );

    let package = repositories[0].find("Foo_Bar", "1.0.1").unwrap();
    assert_eq!(package.name(), "foo_bar");
    assert_eq!(package.package_type(), "magento-module");
    assert_eq!(package.extra(), json!({ "package-xml": "package.xml" }));

    assert_eq!(
        host.requires(),
        [
            Link::new("acme/shop", "acme/theme", "^2.0"),
            Link::new("acme/shop", "Foo_Bar", "1.0.*"),
        ]
    );
}

#[tokio::test]
async fn test_missing_extension_does_not_stop_others() {
    let mut server = mockito::Server::new_async().await;
    let missing = server
        .mock("GET", "/community/foo_bar/releases.xml")
        .with_status(404)
        .expect(1)
        .create_async()
        .await;
    let empty = server
        .mock("GET", "/community/Empty_Feed/releases.xml")
        .with_status(200)
        .with_body("")
        .expect(1)
        .create_async()
        .await;
    let found = server
        .mock("GET", "/community/Baz_Qux/releases.xml")
        .with_status(200)
        .with_body(releases_xml(&["2.1.0"]))
        .expect(1)
        .create_async()
        .await;

    let manifest = manifest_for(
        &server.url(),
        r#"{ "foo_bar": "*", "Empty_Feed": "*", "Baz_Qux": "2.*" }"#,
    );
    let (host, report) = run_activation(&manifest).await;

    missing.assert_async().await;
    empty.assert_async().await;
    found.assert_async().await;

    assert_eq!(report.resolved.len(), 1);
    assert_eq!(report.resolved[0].key, "Baz_Qux");
    assert_eq!(report.failed.len(), 2);
    assert!(
        report
            .failed
            .iter()
            .all(|f| f.kind == FailureKind::Unavailable)
    );
    assert!(report.failed[0].message.contains("did not return a 200 response"));
    assert!(report.failed[1].message.contains("returned nothing"));

    let errors = host.errors();
    assert_eq!(errors.len(), 2);
    assert!(errors[0].contains("Did you get the casing right?"));
    assert_eq!(host.requires().len(), 2);
}

#[tokio::test]
async fn test_malformed_feed_reports_parser_output() {
    let mut server = mockito::Server::new_async().await;
    let _feed = server
        .mock("GET", "/community/Foo_Bar/releases.xml")
        .with_status(200)
        .with_body("<releases>\n<r><v>1.0.0</x></r>\n")
        .create_async()
        .await;

    let manifest = manifest_for(&server.url(), r#"{ "Foo_Bar": "*" }"#);
    let (host, report) = run_activation(&manifest).await;

    assert!(report.resolved.is_empty());
    assert_eq!(report.failed[0].kind, FailureKind::Malformed);

    let errors = host.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("\"Foo_Bar\""));
    assert!(errors[0].contains("Opening and ending tag mismatch: v line 2 and x"));
    assert!(errors[0].contains("Premature end of data in tag releases line 1"));
    assert!(host.repositories().is_empty());
}

#[tokio::test]
async fn test_registered_handler_extracts_module() {
    let mut server = mockito::Server::new_async().await;
    let _feed = server
        .mock("GET", "/community/Foo_Bar/releases.xml")
        .with_status(200)
        .with_body(releases_xml(&["1.0.0"]))
        .create_async()
        .await;

    let manifest = manifest_for(&server.url(), r#"{ "Foo_Bar": "*" }"#);
    let (host, _) = run_activation(&manifest).await;

    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("Foo_Bar-1.0.0.tgz");
    write_module_tgz(&archive, "Foo_Bar");
    let destination = dir.path().join("vendor/foo_bar");

    host.extract(ArchiveKind::Tar, &archive, &destination)
        .unwrap();

    let package_xml = std::fs::read_to_string(destination.join("package.xml")).unwrap();
    assert!(package_xml.contains("Foo_Bar"));
}

#[tokio::test]
async fn test_no_declared_packages_does_nothing() {
    let manifest: Manifest = serde_json::from_value(json!({ "name": "acme/shop" })).unwrap();
    let (host, report) = run_activation(&manifest).await;

    assert!(report.is_empty());
    assert!(host.handler(ArchiveKind::Tar).is_none());
    assert!(host.requires().is_empty());
    assert_eq!(host.name(), "acme/shop");
}

#[tokio::test]
async fn test_empty_declaration_still_registers_handler() {
    let server = mockito::Server::new_async().await;
    let manifest = manifest_for(&server.url(), "{}");
    let (host, report) = run_activation(&manifest).await;

    assert!(report.is_empty());
    assert!(host.handler(ArchiveKind::Tar).is_some());
    assert_eq!(
        host.requires(),
        [Link::new("acme/shop", "acme/theme", "^2.0")]
    );
}
