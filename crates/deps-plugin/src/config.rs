use crate::error::{PluginError, Result};
use deps_connect::{COMMUNITY_BASE, ConnectRegistry};
use deps_core::{FeedClient, HostContext, HttpFetcher, Link, RootPackage};
use deps_tar::ExtractorConfig;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Registry locations and HTTP settings.
///
/// Read from the `extra.connect` section of the root manifest. All fields
/// use sensible defaults if not specified.
///
/// # Examples
///
/// ```
/// use deps_plugin::config::ConnectConfig;
///
/// let json = r#"{
///     "feed-base": "https://mirror.example.test/community",
///     "http": { "timeout-secs": 5 }
/// }"#;
///
/// let config: ConnectConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.feed_base, "https://mirror.example.test/community");
/// assert_eq!(config.dist_base, "https://connect20.magentocommerce.com/community");
/// assert_eq!(config.http.timeout_secs, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConnectConfig {
    #[serde(default = "default_base")]
    pub feed_base: String,
    #[serde(default = "default_base")]
    pub dist_base: String,
    #[serde(default)]
    pub http: HttpConfig,
}

impl ConnectConfig {
    /// Builds a registry client for these settings.
    ///
    /// `file://` feed bases are read from disk; everything else goes over
    /// HTTP with the configured timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn registry(&self) -> deps_core::Result<ConnectRegistry> {
        let http = HttpFetcher::with_options(self.http.timeout(), &self.http.user_agent)?;
        Ok(ConnectRegistry::with_bases(
            Arc::new(FeedClient::new(http)),
            &self.feed_base,
            &self.dist_base,
        ))
    }
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            feed_base: default_base(),
            dist_base: default_base(),
            http: HttpConfig::default(),
        }
    }
}

/// HTTP client settings for release feed requests.
///
/// # Defaults
///
/// - `timeout_secs`: `30`
/// - `user_agent`: `"deps-connect/<version>"`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HttpConfig {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_base() -> String {
    COMMUNITY_BASE.to_string()
}

const fn default_timeout() -> u64 {
    deps_core::fetch::DEFAULT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    deps_core::fetch::DEFAULT_USER_AGENT.to_string()
}

/// Root project manifest.
///
/// Only the fields the connect plugin reads are modelled; everything else
/// in the file is ignored.
///
/// ```json
/// {
///     "name": "acme/shop",
///     "require": { "acme/theme": "^2.0" },
///     "extra": {
///         "connect-packages": { "Foo_Bar": "1.0.*" },
///         "connect": { "feed-base": "https://mirror.example.test/community" },
///         "connect-tar": { "success-signal": "exit-status" }
///     }
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "ordered_pairs")]
    pub require: Vec<(String, String)>,
    #[serde(default)]
    pub extra: ManifestExtra,
}

/// The `extra` section of the root manifest.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ManifestExtra {
    /// `None` when the section is absent; `Some` of an empty list when it is
    /// declared but empty.
    #[serde(default, deserialize_with = "optional_ordered_pairs")]
    pub connect_packages: Option<Vec<(String, String)>>,
    #[serde(default)]
    pub connect: ConnectConfig,
    #[serde(default)]
    pub connect_tar: ExtractorConfig,
}

impl Manifest {
    /// Reads and parses a JSON manifest file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| PluginError::manifest_read(path, e))?;
        serde_json::from_str(&content).map_err(|e| PluginError::manifest_parse(path, e))
    }

    /// Declared connect packages in declaration order.
    pub fn connect_packages(&self) -> &[(String, String)] {
        self.extra.connect_packages.as_deref().unwrap_or_default()
    }

    pub fn connect_config(&self) -> &ConnectConfig {
        &self.extra.connect
    }

    pub fn extractor_config(&self) -> ExtractorConfig {
        self.extra.connect_tar
    }

    /// Builds an in-memory host for this project.
    pub fn host(&self) -> HostContext {
        let mut host = HostContext::new(&self.name);
        if let Some(packages) = &self.extra.connect_packages {
            host = host.with_connect_packages(packages.clone());
        }
        host.set_requires(
            self.require
                .iter()
                .map(|(target, constraint)| Link::new(&self.name, target, constraint))
                .collect(),
        );
        host
    }
}

/// Deserializes a JSON object of strings into pairs, keeping key order.
fn ordered_pairs<'de, D>(deserializer: D) -> std::result::Result<Vec<(String, String)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PairsVisitor;

    impl<'de> Visitor<'de> for PairsVisitor {
        type Value = Vec<(String, String)>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("an object mapping package names to version constraints")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(pair) = map.next_entry::<String, String>()? {
                pairs.push(pair);
            }
            Ok(pairs)
        }
    }

    deserializer.deserialize_map(PairsVisitor)
}

fn optional_ordered_pairs<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Vec<(String, String)>>, D::Error>
where
    D: Deserializer<'de>,
{
    ordered_pairs(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deps_tar::SuccessSignal;

    #[test]
    fn test_defaults() {
        let config = ConnectConfig::default();
        assert_eq!(config.feed_base, COMMUNITY_BASE);
        assert_eq!(config.dist_base, COMMUNITY_BASE);
        assert_eq!(config.http.timeout_secs, 30);
        assert!(config.http.user_agent.starts_with("deps-connect/"));
        assert_eq!(config.http.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_registry_uses_configured_bases() {
        let config = ConnectConfig {
            feed_base: "file:///srv/connect".into(),
            dist_base: "http://example.test/community".into(),
            http: HttpConfig::default(),
        };

        let registry = config.registry().unwrap();
        assert_eq!(registry.feed_base(), "file:///srv/connect");
        assert_eq!(registry.dist_base(), "http://example.test/community");
    }

    #[test]
    fn test_empty_manifest() {
        let manifest: Manifest = serde_json::from_str("{}").unwrap();
        assert!(manifest.extra.connect_packages.is_none());
        assert!(manifest.connect_packages().is_empty());
        assert_eq!(manifest.connect_config(), &ConnectConfig::default());
        assert_eq!(
            manifest.extractor_config().success_signal,
            SuccessSignal::ExitStatus
        );
    }

    #[test]
    fn test_connect_packages_keep_declaration_order() {
        let manifest: Manifest = serde_json::from_str(
            r#"{
                "name": "acme/shop",
                "extra": {
                    "connect-packages": {
                        "Zeta_Module": "*",
                        "Alpha_Module": "1.0.*",
                        "Mid_Module": ">=2.0"
                    }
                }
            }"#,
        )
        .unwrap();

        let keys: Vec<_> = manifest
            .connect_packages()
            .iter()
            .map(|(key, _)| key.as_str())
            .collect();
        assert_eq!(keys, ["Zeta_Module", "Alpha_Module", "Mid_Module"]);
        assert_eq!(manifest.connect_packages()[1].1, "1.0.*");
    }

    #[test]
    fn test_declared_but_empty_connect_packages() {
        let manifest: Manifest =
            serde_json::from_str(r#"{"extra": {"connect-packages": {}}}"#).unwrap();
        assert_eq!(manifest.extra.connect_packages, Some(Vec::new()));
        assert_eq!(manifest.host().connect_packages(), Some(Vec::new()));

        let absent: Manifest = serde_json::from_str(r#"{"extra": {}}"#).unwrap();
        assert_eq!(absent.host().connect_packages(), None);
    }

    #[test]
    fn test_full_extra_section() {
        let manifest: Manifest = serde_json::from_str(
            r#"{
                "name": "acme/shop",
                "require": {"acme/theme": "^2.0"},
                "extra": {
                    "connect": {
                        "feed-base": "file:///srv/connect",
                        "dist-base": "http://example.test/community",
                        "http": {"user-agent": "acme-ci"}
                    },
                    "connect-tar": {"success-signal": "silent-output"}
                }
            }"#,
        )
        .unwrap();

        let config = manifest.connect_config();
        assert_eq!(config.feed_base, "file:///srv/connect");
        assert_eq!(config.dist_base, "http://example.test/community");
        assert_eq!(config.http.user_agent, "acme-ci");
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(
            manifest.extractor_config().success_signal,
            SuccessSignal::SilentOutput
        );
        assert_eq!(
            manifest.require,
            [("acme/theme".to_string(), "^2.0".to_string())]
        );
    }

    #[test]
    fn test_rejects_non_string_constraint() {
        let result: serde_json::Result<Manifest> =
            serde_json::from_str(r#"{"extra": {"connect-packages": {"Foo_Bar": 1}}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_host_from_manifest() {
        let manifest: Manifest = serde_json::from_str(
            r#"{
                "name": "acme/shop",
                "require": {"acme/theme": "^2.0"},
                "extra": {"connect-packages": {"Foo_Bar": "1.0.*"}}
            }"#,
        )
        .unwrap();

        let host = manifest.host();
        assert_eq!(host.name(), "acme/shop");
        assert_eq!(
            host.connect_packages(),
            Some(vec![("Foo_Bar".to_string(), "1.0.*".to_string())])
        );
        assert_eq!(
            host.requires(),
            [Link::new("acme/shop", "acme/theme", "^2.0")]
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Manifest::load(&dir.path().join("composer.json")).unwrap_err();
        assert!(matches!(err, PluginError::ManifestRead { .. }));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("composer.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Manifest::load(&path).unwrap_err();
        assert!(matches!(err, PluginError::ManifestParse { .. }));
        assert!(err.to_string().contains("composer.json"));
    }
}
