//! Configuration validation.
//!
//! Rules produce issues; the caller decides what to do with them. Every rule
//! runs, so a report lists all problems at once. Nothing here mutates the
//! configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{config::Configuration, config::ProxyGroup, settings::keys};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Generation must not proceed.
    Error,
    /// Reported, but generation proceeds.
    Warning,
}

/// One problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub rule: String,
    pub severity: Severity,
    /// Setting key(s) involved.
    pub key: String,
    pub message: String,
    /// Offending value, when there is one worth showing.
    pub value: Option<String>,
}

impl ValidationIssue {
    fn error(rule: &str, key: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_owned(),
            severity: Severity::Error,
            key: key.to_owned(),
            message: message.into(),
            value: None,
        }
    }

    fn warning(rule: &str, key: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_owned(),
            severity: Severity::Warning,
            key: key.to_owned(),
            message: message.into(),
            value: None,
        }
    }

    fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.message)?;
        if let Some(value) = &self.value {
            write!(f, " (got '{value}')")?;
        }
        Ok(())
    }
}

/// Outcome of validating one configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(ValidationIssue::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }
}

/// A single validation rule.
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;
    fn check(&self, config: &Configuration) -> Vec<ValidationIssue>;
}

/// `scheme://rest` where scheme is http or https and rest is non-empty.
pub fn is_http_url(value: &str) -> bool {
    match value.split_once("://") {
        Some((scheme, rest)) => {
            matches!(scheme.to_ascii_lowercase().as_str(), "http" | "https")
                && !rest.is_empty()
                && !rest.starts_with('/')
        }
        None => false,
    }
}

/// Characters a value may use when it is spliced unquoted into a `RUN`
/// line. No whitespace, quotes, globs, expansions or command separators.
fn is_shell_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, '-' | '.' | '_' | '/' | ':' | '@' | '%' | '+' | '=' | ',')
}

/// An http(s) URL that is safe to pass to `git clone` as a single word.
pub fn is_clone_url(value: &str) -> bool {
    is_http_url(value) && value.chars().all(is_shell_word_char)
}

/// A package name or pip requirement such as `jq` or `rich>=13`.
pub fn is_package_spec(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && value.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '_' | ':' | '=' | '<' | '>' | '-')
        })
}

// --- Concrete Rules ---

pub struct RequiredIdentityRule;

impl ValidationRule for RequiredIdentityRule {
    fn name(&self) -> &'static str {
        "required"
    }

    fn check(&self, config: &Configuration) -> Vec<ValidationIssue> {
        let mut issues = vec![];

        if config.name().trim().is_empty() {
            issues.push(ValidationIssue::error(
                self.name(),
                keys::CONTAINER_NAME,
                "container name is required",
            ));
        }
        if config.port.is_absent() || config.port() == 0 {
            issues.push(ValidationIssue::error(
                self.name(),
                keys::PORT,
                "published port is required",
            ));
        }

        issues
    }
}

pub struct ProxyRule;

impl ProxyRule {
    fn check_group(
        &self,
        group: &ProxyGroup,
        enabled_key: &str,
        url_keys: [&str; 2],
        issues: &mut Vec<ValidationIssue>,
    ) {
        if group.is_enabled() && group.has_no_urls() {
            issues.push(ValidationIssue::warning(
                self.name(),
                enabled_key,
                "proxy is enabled but no HTTP or HTTPS proxy URL is set; empty values will be used",
            ));
        }

        for (key, value) in url_keys.iter().zip([group.http.as_str(), group.https.as_str()]) {
            if !value.is_empty() && !is_http_url(value) {
                issues.push(
                    ValidationIssue::error(self.name(), key, "must be an http:// or https:// URL")
                        .with_value(value),
                );
            }
        }
    }
}

impl ValidationRule for ProxyRule {
    fn name(&self) -> &'static str {
        "proxy"
    }

    fn check(&self, config: &Configuration) -> Vec<ValidationIssue> {
        let mut issues = vec![];
        self.check_group(
            &config.build_proxy,
            keys::BUILD_PROXY_ENABLED,
            [keys::BUILD_HTTP_PROXY, keys::BUILD_HTTPS_PROXY],
            &mut issues,
        );
        self.check_group(
            &config.runtime_proxy,
            keys::RUNTIME_PROXY_ENABLED,
            [keys::RUNTIME_HTTP_PROXY, keys::RUNTIME_HTTPS_PROXY],
            &mut issues,
        );
        issues
    }
}

pub struct RegistryRule;

impl ValidationRule for RegistryRule {
    fn name(&self) -> &'static str {
        "registry"
    }

    fn check(&self, config: &Configuration) -> Vec<ValidationIssue> {
        let registry = &config.registry;
        if !registry.is_enabled() {
            return vec![];
        }

        [
            (keys::REGISTRY_USERNAME, &registry.username),
            (keys::REGISTRY_TOKEN, &registry.token),
            (keys::REGISTRY_REPOSITORY, &registry.repository),
        ]
        .into_iter()
        .filter(|(_, setting)| setting.as_str().trim().is_empty())
        .map(|(key, _)| {
            ValidationIssue::error(
                self.name(),
                key,
                "required when registry publishing is enabled",
            )
        })
        .collect()
    }
}

pub struct CloneRule;

impl ValidationRule for CloneRule {
    fn name(&self) -> &'static str {
        "clone"
    }

    fn check(&self, config: &Configuration) -> Vec<ValidationIssue> {
        let mut issues = vec![];
        let repositories = config.clone.repositories.as_slice();

        if config.clone.is_enabled() && repositories.is_empty() {
            issues.push(ValidationIssue::error(
                self.name(),
                keys::CLONE_REPOS,
                "at least one repository is required when cloning is enabled",
            ));
        }

        for url in repositories {
            if !is_clone_url(url) {
                issues.push(
                    ValidationIssue::error(
                        self.name(),
                        keys::CLONE_REPOS,
                        "must be an http:// or https:// URL without spaces, quotes or shell metacharacters",
                    )
                    .with_value(url),
                );
            }
        }

        if config.clone.is_enabled() {
            if let Some(problem) = base_path_problem(config.clone.base_path.as_str()) {
                issues.push(
                    ValidationIssue::error(self.name(), keys::CLONE_BASE_PATH, problem)
                        .with_value(config.clone.base_path.as_str()),
                );
            }
        }

        issues
    }
}

/// The clone stage's install path is copied wholesale into the runtime
/// image, so it must be a real absolute directory below `/`.
fn base_path_problem(path: &str) -> Option<&'static str> {
    if path.trim().is_empty() {
        Some("a base path is required when cloning is enabled")
    } else if !path.starts_with('/') {
        Some("must be an absolute path")
    } else if path.trim_end_matches('/').is_empty() {
        Some("must not be the filesystem root")
    } else if !path.chars().all(is_shell_word_char) {
        Some("must not contain spaces, quotes or shell metacharacters")
    } else {
        None
    }
}

pub struct PackageRule;

impl ValidationRule for PackageRule {
    fn name(&self) -> &'static str {
        "packages"
    }

    fn check(&self, config: &Configuration) -> Vec<ValidationIssue> {
        [
            (keys::EXTRA_APT_PACKAGES, &config.packages.os),
            (keys::EXTRA_PIP_PACKAGES, &config.packages.language),
        ]
        .into_iter()
        .flat_map(|(key, setting)| {
            setting
                .as_slice()
                .iter()
                .filter(|package| !is_package_spec(package))
                .map(move |package| {
                    ValidationIssue::error(
                        self.name(),
                        key,
                        "package names may only use letters, digits and . + _ : = < > -",
                    )
                    .with_value(package)
                })
        })
        .collect()
    }
}

/// Runs every rule and collects the issues.
pub struct ConfigValidator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ConfigValidator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(RequiredIdentityRule),
                Box::new(ProxyRule),
                Box::new(RegistryRule),
                Box::new(CloneRule),
                Box::new(PackageRule),
            ],
        }
    }

    pub fn validate(&self, config: &Configuration) -> ValidationReport {
        ValidationReport {
            issues: self
                .rules
                .iter()
                .flat_map(|rule| rule.check(config))
                .collect(),
        }
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate with the standard rule set.
pub fn validate(config: &Configuration) -> ValidationReport {
    ConfigValidator::new().validate(config)
}
