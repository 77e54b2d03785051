//! Setting names, values, and where each value came from.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Names of every key the generator understands.
pub mod keys {
    pub const CONTAINER_NAME: &str = "CONTAINER_NAME";
    pub const PORT: &str = "PORT";

    pub const BUILD_PROXY_ENABLED: &str = "BUILD_PROXY_ENABLED";
    pub const BUILD_HTTP_PROXY: &str = "BUILD_HTTP_PROXY";
    pub const BUILD_HTTPS_PROXY: &str = "BUILD_HTTPS_PROXY";
    pub const BUILD_NO_PROXY: &str = "BUILD_NO_PROXY";

    pub const RUNTIME_PROXY_ENABLED: &str = "RUNTIME_PROXY_ENABLED";
    pub const RUNTIME_HTTP_PROXY: &str = "RUNTIME_HTTP_PROXY";
    pub const RUNTIME_HTTPS_PROXY: &str = "RUNTIME_HTTPS_PROXY";
    pub const RUNTIME_NO_PROXY: &str = "RUNTIME_NO_PROXY";

    pub const EXTRA_APT_PACKAGES: &str = "EXTRA_APT_PACKAGES";
    pub const EXTRA_PIP_PACKAGES: &str = "EXTRA_PIP_PACKAGES";

    pub const CLONE_ENABLED: &str = "CLONE_ENABLED";
    pub const CLONE_REPOS: &str = "CLONE_REPOS";
    pub const CLONE_BASE_PATH: &str = "CLONE_BASE_PATH";

    pub const REGISTRY_ENABLED: &str = "REGISTRY_ENABLED";
    pub const REGISTRY_HOST: &str = "REGISTRY_HOST";
    pub const REGISTRY_USERNAME: &str = "REGISTRY_USERNAME";
    pub const REGISTRY_TOKEN: &str = "REGISTRY_TOKEN";
    pub const REGISTRY_REPOSITORY: &str = "REGISTRY_REPOSITORY";
    pub const REGISTRY_TAG: &str = "REGISTRY_TAG";

    /// Every known key, in settings-file order.
    pub const ALL: &[&str] = &[
        CONTAINER_NAME,
        PORT,
        BUILD_PROXY_ENABLED,
        BUILD_HTTP_PROXY,
        BUILD_HTTPS_PROXY,
        BUILD_NO_PROXY,
        RUNTIME_PROXY_ENABLED,
        RUNTIME_HTTP_PROXY,
        RUNTIME_HTTPS_PROXY,
        RUNTIME_NO_PROXY,
        EXTRA_APT_PACKAGES,
        EXTRA_PIP_PACKAGES,
        CLONE_ENABLED,
        CLONE_REPOS,
        CLONE_BASE_PATH,
        REGISTRY_ENABLED,
        REGISTRY_HOST,
        REGISTRY_USERNAME,
        REGISTRY_TOKEN,
        REGISTRY_REPOSITORY,
        REGISTRY_TAG,
    ];

    /// Keys whose values are secrets and must never be echoed back.
    pub const SECRET: &[&str] = &[REGISTRY_TOKEN];

    pub fn is_known(key: &str) -> bool {
        ALL.contains(&key)
    }
}

/// Where a setting's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Supplied by the settings file or the caller.
    Explicit,
    /// Not supplied; a built-in default applies.
    Default,
    /// Not supplied and no default exists.
    Absent,
}

impl Provenance {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::Default => "default",
            Self::Absent => "absent",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed setting value together with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting<T> {
    value: T,
    provenance: Provenance,
}

impl<T> Setting<T> {
    pub fn explicit(value: T) -> Self {
        Self {
            value,
            provenance: Provenance::Explicit,
        }
    }

    pub fn default_value(value: T) -> Self {
        Self {
            value,
            provenance: Provenance::Default,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn is_absent(&self) -> bool {
        self.provenance == Provenance::Absent
    }
}

impl<T: Default> Setting<T> {
    /// A setting that was never supplied and has no default.
    pub fn absent() -> Self {
        Self {
            value: T::default(),
            provenance: Provenance::Absent,
        }
    }
}

impl Setting<String> {
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl Setting<Vec<String>> {
    pub fn as_slice(&self) -> &[String] {
        &self.value
    }
}

// ── Raw value parsing ─────────────────────────────────────────────────────────

/// Parse a boolean in any of the spellings settings files use.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" | "" => Some(false),
        _ => None,
    }
}

/// Split a list value on whitespace and commas, dropping empty entries.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
