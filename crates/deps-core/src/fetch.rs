use crate::error::{DepsError, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use reqwest::redirect::Policy;
use std::path::PathBuf;
use std::time::Duration;

/// Default request timeout for registry fetches.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default user agent sent with registry fetches.
pub const DEFAULT_USER_AGENT: &str = concat!("deps-connect/", env!("CARGO_PKG_VERSION"));

const FILE_SCHEME: &str = "file://";

/// Raw outcome of a single fetch.
///
/// `status` is `None` for transports without status codes (local files).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: Option<u16>,
    pub body: Bytes,
}

impl FetchResponse {
    pub fn new(status: Option<u16>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Transport seam used by registry clients.
///
/// Every call performs exactly one outbound request; implementors must not
/// retry or serve stale data. Timeouts belong to the implementor's
/// configuration.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetches `url`, returning the status and body whatever the status is.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was obtained at all.
    async fn fetch(&self, url: &str) -> Result<FetchResponse>;
}

/// HTTP fetcher backed by `reqwest`.
///
/// # Examples
///
/// ```no_run
/// use deps_core::{FeedFetcher, HttpFetcher};
///
/// # async fn example() -> deps_core::error::Result<()> {
/// let fetcher = HttpFetcher::new()?;
/// let response = fetcher.fetch("https://example.test/Foo/releases.xml").await?;
/// println!("status {:?}, {} bytes", response.status, response.body.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with the default timeout and user agent.
    pub fn new() -> Result<Self> {
        Self::with_options(Duration::from_secs(DEFAULT_TIMEOUT_SECS), DEFAULT_USER_AGENT)
    }

    /// Creates a fetcher with the given timeout and user agent.
    ///
    /// Redirects are not followed: a 3xx answer is returned as is.
    pub fn with_options(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(Policy::none())
            .build()
            .map_err(DepsError::ClientBuild)?;

        Ok(Self { client })
    }

    /// Wraps a preconfigured client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        tracing::debug!("fetching {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DepsError::RequestError {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| DepsError::RequestError {
                url: url.to_string(),
                source: e,
            })?;

        tracing::debug!("{} answered {} with {} bytes", url, status, body.len());
        Ok(FetchResponse::new(Some(status), body))
    }
}

/// Fetcher for `file://` registries.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

impl FileFetcher {
    fn path_for(url: &str) -> Result<PathBuf> {
        url.strip_prefix(FILE_SCHEME)
            .map(PathBuf::from)
            .ok_or_else(|| DepsError::InvalidUrl(url.to_string()))
    }
}

#[async_trait]
impl FeedFetcher for FileFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        let path = Self::path_for(url)?;
        tracing::debug!("reading {}", path.display());
        let body = tokio::fs::read(&path).await?;
        Ok(FetchResponse::new(None, body))
    }
}

/// Routes `file://` URLs to [`FileFetcher`] and everything else to HTTP.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: HttpFetcher,
    file: FileFetcher,
}

impl FeedClient {
    pub fn new(http: HttpFetcher) -> Self {
        Self {
            http,
            file: FileFetcher,
        }
    }
}

#[async_trait]
impl FeedFetcher for FeedClient {
    async fn fetch(&self, url: &str) -> Result<FetchResponse> {
        if url.starts_with(FILE_SCHEME) {
            self.file.fetch(url).await
        } else {
            self.http.fetch(url).await
        }
    }
}
