//! Connect registry client.
//!
//! Provides access to a connect registry via:
//! - Release feed (`<feed-base>/{key}/releases.xml`) for version lookups
//! - Dist layout (`<dist-base>/{key}/{version}/{key}-{version}.tgz`) for downloads
//!
//! Each resolution performs exactly one request; nothing is cached or retried.

use crate::error::{ConnectError, Result, Unavailable};
use crate::feed::RegistryFeed;
use deps_core::{FeedFetcher, PackageDescriptor, SyntheticRepository};
use std::borrow::Cow;
use std::sync::Arc;

/// Base URL of the public community channel.
pub const COMMUNITY_BASE: &str = "https://connect20.magentocommerce.com/community";

/// Returns the release feed URL for an extension key.
///
/// The key keeps its casing: the registry's path segments are case-sensitive.
///
/// # Examples
///
/// ```
/// # use deps_connect::registry::releases_url;
/// assert_eq!(
///     releases_url("http://example.test/community", "Foo_Bar"),
///     "http://example.test/community/Foo_Bar/releases.xml"
/// );
/// ```
pub fn releases_url(feed_base: &str, extension_key: &str) -> String {
    format!(
        "{}/{}/releases.xml",
        feed_base.trim_end_matches('/'),
        path_segment(extension_key)
    )
}

/// Returns the tarball URL for one release of an extension key.
///
/// # Examples
///
/// ```
/// # use deps_connect::registry::dist_url;
/// assert_eq!(
///     dist_url("http://example.test/community", "Foo_Bar", "1.0.0"),
///     "http://example.test/community/Foo_Bar/1.0.0/Foo_Bar-1.0.0.tgz"
/// );
/// ```
pub fn dist_url(dist_base: &str, extension_key: &str, version: &str) -> String {
    let key = path_segment(extension_key);
    let version = path_segment(version);
    format!(
        "{}/{key}/{version}/{key}-{version}.tgz",
        dist_base.trim_end_matches('/')
    )
}

/// Characters RFC 3986 allows verbatim in a path segment.
fn is_segment_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-._~!$&'()*+,;=:@".contains(c)
}

/// Percent-encodes what would break out of a single path segment.
///
/// Keys and versions are usually left untouched, so `1.0.0+b1` stays as
/// published. `.` and `..` are encoded whole.
fn path_segment(raw: &str) -> Cow<'_, str> {
    if raw == "." || raw == ".." {
        return Cow::Owned(raw.replace('.', "%2E"));
    }
    if raw.chars().all(is_segment_char) {
        return Cow::Borrowed(raw);
    }

    let mut encoded = String::with_capacity(raw.len() + 8);
    let mut buf = [0u8; 4];
    for c in raw.chars() {
        if is_segment_char(c) {
            encoded.push(c);
        } else {
            encoded.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    Cow::Owned(encoded)
}

/// Client for a connect registry.
///
/// All fetches go through the provided [`FeedFetcher`].
///
/// # Examples
///
/// ```no_run
/// # use deps_connect::ConnectRegistry;
/// # use deps_core::HttpFetcher;
/// # use std::sync::Arc;
/// # #[tokio::main]
/// # async fn main() {
/// let fetcher = Arc::new(HttpFetcher::new().unwrap());
/// let registry = ConnectRegistry::new(fetcher);
///
/// let repository = registry.resolve("Foo_Bar").await.unwrap();
/// for package in repository.packages() {
///     println!("{} {} {}", package.name(), package.version(), package.dist_url());
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct ConnectRegistry {
    fetcher: Arc<dyn FeedFetcher>,
    feed_base: String,
    dist_base: String,
}

impl ConnectRegistry {
    /// Creates a client for the public community channel.
    pub fn new(fetcher: Arc<dyn FeedFetcher>) -> Self {
        Self::with_bases(fetcher, COMMUNITY_BASE, COMMUNITY_BASE)
    }

    pub fn with_bases(
        fetcher: Arc<dyn FeedFetcher>,
        feed_base: impl Into<String>,
        dist_base: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            feed_base: feed_base.into(),
            dist_base: dist_base.into(),
        }
    }

    pub fn feed_base(&self) -> &str {
        &self.feed_base
    }

    pub fn dist_base(&self) -> &str {
        &self.dist_base
    }

    /// Fetches the release feed for `extension_key` and returns its versions
    /// in document order.
    ///
    /// # Errors
    ///
    /// - `RegistryUnavailable` if the request fails, the status is not 200,
    ///   or the body is empty
    /// - `FeedMalformed` if the body is not well-formed XML
    pub async fn resolve_versions(&self, extension_key: &str) -> Result<Vec<String>> {
        let url = releases_url(&self.feed_base, extension_key);

        let response = self.fetcher.fetch(&url).await.map_err(|e| {
            ConnectError::unavailable(extension_key, &url, Unavailable::Transport(e.to_string()))
        })?;

        if let Some(status) = response.status.filter(|&s| s != 200) {
            return Err(ConnectError::unavailable(
                extension_key,
                url,
                Unavailable::Status(status),
            ));
        }

        if response.body.is_empty() {
            return Err(ConnectError::unavailable(
                extension_key,
                url,
                Unavailable::EmptyBody,
            ));
        }

        let feed = RegistryFeed::parse(&response.body)
            .map_err(|diagnostics| ConnectError::malformed(extension_key, &url, diagnostics))?;

        tracing::debug!(
            "{} lists {} release(s) for {}",
            url,
            feed.versions().len(),
            extension_key
        );

        Ok(feed.into_versions())
    }

    /// Maps versions to descriptors, preserving order. Performs no I/O.
    pub fn build_descriptors(&self, extension_key: &str, versions: &[String]) -> SyntheticRepository {
        SyntheticRepository::new(
            versions
                .iter()
                .map(|version| {
                    PackageDescriptor::new(
                        extension_key,
                        version.as_str(),
                        dist_url(&self.dist_base, extension_key, version),
                    )
                })
                .collect(),
        )
    }

    /// Resolves the versions of `extension_key` and builds its repository.
    pub async fn resolve(&self, extension_key: &str) -> Result<SyntheticRepository> {
        let versions = self.resolve_versions(extension_key).await?;
        Ok(self.build_descriptors(extension_key, &versions))
    }
}
