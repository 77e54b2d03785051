//! Application layer errors.
//!
//! These errors represent failures in orchestration, not business logic.
//! Business logic errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::{ArtifactKind, DomainError, ValidationIssue};
use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// One or more settings values could not be parsed.
    #[error("{} setting(s) could not be parsed", errors.len())]
    InvalidSettings { errors: Vec<DomainError> },

    /// Validation reported fatal issues; nothing was written.
    #[error("Configuration is invalid: {} error(s)", issues.len())]
    InvalidConfiguration { issues: Vec<ValidationIssue> },

    /// The settings file is missing or unreadable.
    #[error("Cannot read settings from {path}: {reason}")]
    SettingsUnreadable { path: PathBuf, reason: String },

    /// Manifest rendering failed.
    #[error("Rendering the {artifact} failed: {reason}")]
    RenderingFailed {
        artifact: ArtifactKind,
        reason: String,
    },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// Push requested while REGISTRY_ENABLED is off.
    #[error("Registry publishing is disabled")]
    RegistryDisabled,

    /// The container engine could not be run at all.
    #[error("Container engine '{engine}' is unavailable: {reason}")]
    EngineUnavailable { engine: String, reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidSettings { errors } => errors.iter().map(ToString::to_string).collect(),
            Self::InvalidConfiguration { issues } => issues
                .iter()
                .filter(|i| i.is_error())
                .map(ToString::to_string)
                .collect(),
            Self::SettingsUnreadable { path, .. } => vec![
                format!("Expected a settings file at {}", path.display()),
                "Create one with: podgen init".into(),
                "Or point at another file with --settings".into(),
            ],
            Self::RenderingFailed { .. } => vec!["Re-run with -vvv for details".into()],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Re-run generation to restore a consistent pair of manifests".into(),
            ],
            Self::RegistryDisabled => vec![
                "Set REGISTRY_ENABLED=true in your settings file".into(),
                "Also set REGISTRY_USERNAME, REGISTRY_TOKEN and REGISTRY_REPOSITORY".into(),
            ],
            Self::EngineUnavailable { engine, .. } => vec![
                format!("Check that '{engine}' is installed and on PATH"),
                "Or set engine in the podgen config file".into(),
            ],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidSettings { .. } => ErrorCategory::Configuration,
            Self::InvalidConfiguration { .. } => ErrorCategory::Validation,
            Self::SettingsUnreadable { .. } => ErrorCategory::NotFound,
            Self::RegistryDisabled => ErrorCategory::Configuration,
            Self::EngineUnavailable { .. } => ErrorCategory::NotFound,
            Self::RenderingFailed { .. } | Self::FilesystemError { .. } => ErrorCategory::Internal,
        }
    }
}

/// Failure pushing one tag. Reported per tag and never fatal to generation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PushError {
    #[error("Authentication to {registry} failed: {reason}")]
    Authentication { registry: String, reason: String },

    #[error("Local image '{image}' does not exist")]
    ImageNotFound { image: String },

    #[error("Network failure: {reason}")]
    Network { reason: String },

    #[error("Container engine failed: {reason}")]
    Engine { reason: String },
}

impl PushError {
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Authentication { registry, .. } => vec![
                format!("Check REGISTRY_USERNAME and REGISTRY_TOKEN for {registry}"),
                "Tokens need push (write) scope".into(),
            ],
            Self::ImageNotFound { image } => vec![format!("Build it first: podman build -t {image} .")],
            Self::Network { .. } => vec!["Check connectivity and proxy settings, then retry".into()],
            Self::Engine { .. } => vec!["Re-run with -vvv to see the engine output".into()],
        }
    }
}
