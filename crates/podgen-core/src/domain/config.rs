//! The generator configuration.
//!
//! A [`Configuration`] is built once from a flat key/value map and is read-only
//! afterwards. Every downstream component (validator, composer, both manifest
//! writers, the tag resolver) is a function of it.
//!
//! Each optional group carries its own `enabled` flag. Enabling one group
//! never turns on another.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::{
    error::DomainError,
    settings::{Provenance, Setting, keys, parse_bool, parse_list},
};

/// Default install path for the clone stage.
pub const DEFAULT_CLONE_BASE_PATH: &str = "/opt/repos";

/// Default registry host.
pub const DEFAULT_REGISTRY_HOST: &str = "docker.io";

/// HTTP/HTTPS/NO proxy settings for one phase (build or runtime).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyGroup {
    pub enabled: Setting<bool>,
    pub http: Setting<String>,
    pub https: Setting<String>,
    pub no_proxy: Setting<String>,
}

impl ProxyGroup {
    pub fn disabled() -> Self {
        Self {
            enabled: Setting::default_value(false),
            http: Setting::default_value(String::new()),
            https: Setting::default_value(String::new()),
            no_proxy: Setting::default_value(String::new()),
        }
    }

    pub fn enabled(
        http: impl Into<String>,
        https: impl Into<String>,
        no_proxy: impl Into<String>,
    ) -> Self {
        Self {
            enabled: Setting::explicit(true),
            http: Setting::explicit(http.into()),
            https: Setting::explicit(https.into()),
            no_proxy: Setting::explicit(no_proxy.into()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        *self.enabled.value()
    }

    /// True when neither the HTTP nor the HTTPS URL is set.
    pub fn has_no_urls(&self) -> bool {
        self.http.as_str().is_empty() && self.https.as_str().is_empty()
    }

    /// `(http, https, no_proxy)` in the fixed order every manifest uses.
    pub fn values(&self) -> [&str; 3] {
        [self.http.as_str(), self.https.as_str(), self.no_proxy.as_str()]
    }
}

/// Extra packages layered on top of the fixed runtime set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageGroup {
    /// Extra OS (apt) packages.
    pub os: Setting<Vec<String>>,
    /// Extra language (pip) packages.
    pub language: Setting<Vec<String>>,
}

impl Default for PackageGroup {
    fn default() -> Self {
        Self {
            os: Setting::default_value(Vec::new()),
            language: Setting::default_value(Vec::new()),
        }
    }
}

/// Repositories fetched into the image by the clone stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneGroup {
    pub enabled: Setting<bool>,
    pub repositories: Setting<Vec<String>>,
    pub base_path: Setting<String>,
}

impl CloneGroup {
    pub fn is_enabled(&self) -> bool {
        *self.enabled.value()
    }
}

impl Default for CloneGroup {
    fn default() -> Self {
        Self {
            enabled: Setting::default_value(false),
            repositories: Setting::default_value(Vec::new()),
            base_path: Setting::default_value(DEFAULT_CLONE_BASE_PATH.to_owned()),
        }
    }
}

/// Registry publishing credentials and target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryGroup {
    pub enabled: Setting<bool>,
    pub host: Setting<String>,
    pub username: Setting<String>,
    pub token: Setting<String>,
    pub repository: Setting<String>,
    /// Optional explicit version tag.
    pub tag: Setting<String>,
}

impl RegistryGroup {
    pub fn is_enabled(&self) -> bool {
        *self.enabled.value()
    }

    /// `<host>/<namespace>/<repository>` without a tag.
    ///
    /// The username is used as namespace unless the repository already
    /// names one.
    pub fn remote_repository(&self) -> String {
        let repository = self.repository.as_str();
        if repository.contains('/') {
            format!("{}/{}", self.host.as_str(), repository)
        } else {
            format!(
                "{}/{}/{}",
                self.host.as_str(),
                self.username.as_str(),
                repository
            )
        }
    }
}

impl Default for RegistryGroup {
    fn default() -> Self {
        Self {
            enabled: Setting::default_value(false),
            host: Setting::default_value(DEFAULT_REGISTRY_HOST.to_owned()),
            username: Setting::default_value(String::new()),
            token: Setting::default_value(String::new()),
            repository: Setting::default_value(String::new()),
            tag: Setting::default_value(String::new()),
        }
    }
}

/// The full, typed generator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    /// Image, service, and container name.
    pub name: Setting<String>,
    /// Published port (container and host side).
    pub port: Setting<u16>,
    pub build_proxy: ProxyGroup,
    pub runtime_proxy: ProxyGroup,
    pub packages: PackageGroup,
    pub clone: CloneGroup,
    pub registry: RegistryGroup,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: Setting::absent(),
            port: Setting::absent(),
            build_proxy: ProxyGroup::disabled(),
            runtime_proxy: ProxyGroup::disabled(),
            packages: PackageGroup::default(),
            clone: CloneGroup::default(),
            registry: RegistryGroup::default(),
        }
    }
}

impl Configuration {
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn port(&self) -> u16 {
        *self.port.value()
    }

    /// Build a configuration from flat `KEY=value` pairs.
    ///
    /// Later duplicates win. Unknown keys are ignored. Every value that does
    /// not parse into its type is reported; nothing is reported only once.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, Vec<DomainError>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut raw: BTreeMap<String, String> = BTreeMap::new();
        for (key, value) in pairs {
            let key = key.into();
            if !keys::is_known(&key) {
                debug!(key = %key, "Ignoring unknown setting");
                continue;
            }
            raw.insert(key, value.into());
        }

        let mut reader = RawReader {
            raw: &raw,
            errors: Vec::new(),
        };

        let config = Self {
            name: reader.string(keys::CONTAINER_NAME, None),
            port: reader.port(keys::PORT),
            build_proxy: ProxyGroup {
                enabled: reader.flag(keys::BUILD_PROXY_ENABLED),
                http: reader.string(keys::BUILD_HTTP_PROXY, Some("")),
                https: reader.string(keys::BUILD_HTTPS_PROXY, Some("")),
                no_proxy: reader.string(keys::BUILD_NO_PROXY, Some("")),
            },
            runtime_proxy: ProxyGroup {
                enabled: reader.flag(keys::RUNTIME_PROXY_ENABLED),
                http: reader.string(keys::RUNTIME_HTTP_PROXY, Some("")),
                https: reader.string(keys::RUNTIME_HTTPS_PROXY, Some("")),
                no_proxy: reader.string(keys::RUNTIME_NO_PROXY, Some("")),
            },
            packages: PackageGroup {
                os: reader.list(keys::EXTRA_APT_PACKAGES),
                language: reader.list(keys::EXTRA_PIP_PACKAGES),
            },
            clone: CloneGroup {
                enabled: reader.flag(keys::CLONE_ENABLED),
                repositories: reader.list(keys::CLONE_REPOS),
                base_path: reader.string(keys::CLONE_BASE_PATH, Some(DEFAULT_CLONE_BASE_PATH)),
            },
            registry: RegistryGroup {
                enabled: reader.flag(keys::REGISTRY_ENABLED),
                host: reader.string(keys::REGISTRY_HOST, Some(DEFAULT_REGISTRY_HOST)),
                username: reader.string(keys::REGISTRY_USERNAME, Some("")),
                token: reader.string(keys::REGISTRY_TOKEN, Some("")),
                repository: reader.string(keys::REGISTRY_REPOSITORY, Some("")),
                tag: reader.string(keys::REGISTRY_TAG, Some("")),
            },
        };

        if reader.errors.is_empty() {
            Ok(config)
        } else {
            Err(reader.errors)
        }
    }

    /// Every setting as `(key, display value, provenance)`, in key order.
    ///
    /// Secret values are masked.
    pub fn entries(&self) -> Vec<(&'static str, String, Provenance)> {
        fn s(key: &'static str, setting: &Setting<String>) -> (&'static str, String, Provenance) {
            let shown = if keys::SECRET.contains(&key) && !setting.as_str().is_empty() {
                "********".to_owned()
            } else {
                setting.as_str().to_owned()
            };
            (key, shown, setting.provenance())
        }
        fn b(key: &'static str, setting: &Setting<bool>) -> (&'static str, String, Provenance) {
            (key, setting.value().to_string(), setting.provenance())
        }
        fn l(
            key: &'static str,
            setting: &Setting<Vec<String>>,
        ) -> (&'static str, String, Provenance) {
            (key, setting.as_slice().join(" "), setting.provenance())
        }

        let port = if self.port.is_absent() {
            String::new()
        } else {
            self.port().to_string()
        };

        vec![
            s(keys::CONTAINER_NAME, &self.name),
            (keys::PORT, port, self.port.provenance()),
            b(keys::BUILD_PROXY_ENABLED, &self.build_proxy.enabled),
            s(keys::BUILD_HTTP_PROXY, &self.build_proxy.http),
            s(keys::BUILD_HTTPS_PROXY, &self.build_proxy.https),
            s(keys::BUILD_NO_PROXY, &self.build_proxy.no_proxy),
            b(keys::RUNTIME_PROXY_ENABLED, &self.runtime_proxy.enabled),
            s(keys::RUNTIME_HTTP_PROXY, &self.runtime_proxy.http),
            s(keys::RUNTIME_HTTPS_PROXY, &self.runtime_proxy.https),
            s(keys::RUNTIME_NO_PROXY, &self.runtime_proxy.no_proxy),
            l(keys::EXTRA_APT_PACKAGES, &self.packages.os),
            l(keys::EXTRA_PIP_PACKAGES, &self.packages.language),
            b(keys::CLONE_ENABLED, &self.clone.enabled),
            l(keys::CLONE_REPOS, &self.clone.repositories),
            s(keys::CLONE_BASE_PATH, &self.clone.base_path),
            b(keys::REGISTRY_ENABLED, &self.registry.enabled),
            s(keys::REGISTRY_HOST, &self.registry.host),
            s(keys::REGISTRY_USERNAME, &self.registry.username),
            s(keys::REGISTRY_TOKEN, &self.registry.token),
            s(keys::REGISTRY_REPOSITORY, &self.registry.repository),
            s(keys::REGISTRY_TAG, &self.registry.tag),
        ]
    }
}

/// Typed reads from the raw map, collecting parse failures.
struct RawReader<'a> {
    raw: &'a BTreeMap<String, String>,
    errors: Vec<DomainError>,
}

impl RawReader<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.raw.get(key).map(|v| v.trim())
    }

    fn string(&mut self, key: &str, default: Option<&str>) -> Setting<String> {
        match (self.get(key), default) {
            (Some(v), _) => Setting::explicit(v.to_owned()),
            (None, Some(d)) => Setting::default_value(d.to_owned()),
            (None, None) => Setting::absent(),
        }
    }

    fn flag(&mut self, key: &str) -> Setting<bool> {
        let Some(v) = self.get(key) else {
            return Setting::default_value(false);
        };
        match parse_bool(v) {
            Some(b) => Setting::explicit(b),
            None => {
                self.errors.push(DomainError::InvalidSetting {
                    key: key.to_owned(),
                    reason: format!("expected a boolean, got '{v}'"),
                });
                Setting::default_value(false)
            }
        }
    }

    fn list(&mut self, key: &str) -> Setting<Vec<String>> {
        match self.get(key) {
            Some(v) => Setting::explicit(parse_list(v)),
            None => Setting::default_value(Vec::new()),
        }
    }

    fn port(&mut self, key: &str) -> Setting<u16> {
        let Some(v) = self.get(key) else {
            return Setting::absent();
        };
        if v.is_empty() {
            return Setting::absent();
        }
        match v.parse::<u16>() {
            Ok(p) if p > 0 => Setting::explicit(p),
            _ => {
                self.errors.push(DomainError::InvalidSetting {
                    key: key.to_owned(),
                    reason: format!("expected a port between 1 and 65535, got '{v}'"),
                });
                Setting::absent()
            }
        }
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Programmatic construction; every value set here is `Explicit`.
#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    config: Configuration,
}

impl ConfigurationBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = Setting::explicit(name.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = Setting::explicit(port);
        self
    }

    pub fn build_proxy(
        mut self,
        http: impl Into<String>,
        https: impl Into<String>,
        no_proxy: impl Into<String>,
    ) -> Self {
        self.config.build_proxy = ProxyGroup::enabled(http, https, no_proxy);
        self
    }

    pub fn runtime_proxy(
        mut self,
        http: impl Into<String>,
        https: impl Into<String>,
        no_proxy: impl Into<String>,
    ) -> Self {
        self.config.runtime_proxy = ProxyGroup::enabled(http, https, no_proxy);
        self
    }

    pub fn extra_os_packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.packages.os = Setting::explicit(packages.into_iter().map(Into::into).collect());
        self
    }

    pub fn extra_language_packages<I, S>(mut self, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.packages.language =
            Setting::explicit(packages.into_iter().map(Into::into).collect());
        self
    }

    /// Enable the clone group with the given repositories.
    pub fn clone_repositories<I, S>(mut self, repositories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.clone.enabled = Setting::explicit(true);
        self.config.clone.repositories =
            Setting::explicit(repositories.into_iter().map(Into::into).collect());
        self
    }

    pub fn clone_base_path(mut self, path: impl Into<String>) -> Self {
        self.config.clone.base_path = Setting::explicit(path.into());
        self
    }

    /// Enable registry publishing.
    pub fn registry(
        mut self,
        username: impl Into<String>,
        token: impl Into<String>,
        repository: impl Into<String>,
    ) -> Self {
        let registry = &mut self.config.registry;
        registry.enabled = Setting::explicit(true);
        registry.username = Setting::explicit(username.into());
        registry.token = Setting::explicit(token.into());
        registry.repository = Setting::explicit(repository.into());
        self
    }

    pub fn registry_host(mut self, host: impl Into<String>) -> Self {
        self.config.registry.host = Setting::explicit(host.into());
        self
    }

    pub fn registry_tag(mut self, tag: impl Into<String>) -> Self {
        self.config.registry.tag = Setting::explicit(tag.into());
        self
    }

    pub fn build(self) -> Configuration {
        self.config
    }
}
