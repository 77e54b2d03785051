// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (so reports can be collected and re-rendered)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    #[error("Invalid value for {key}: {reason}")]
    InvalidSetting { key: String, reason: String },

    // ========================================================================
    // Composition Errors
    // ========================================================================
    #[error("Repositories '{first}' and '{second}' both clone into '{name}'")]
    RepositoryNameCollision {
        name: String,
        first: String,
        second: String,
    },

    #[error("Cannot derive a directory name from repository URL '{url}'")]
    UnderivableRepositoryName { url: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidSetting { key, .. } => vec![
                format!("Check the value of {key} in your settings file"),
                "Booleans accept true/false, yes/no, on/off, 1/0".into(),
            ],
            Self::RepositoryNameCollision { name, .. } => vec![
                format!("Two entries in CLONE_REPOS would be cloned into '{name}'"),
                "Remove one of them, or fork one under a different name".into(),
            ],
            Self::UnderivableRepositoryName { url } => vec![
                format!("'{url}' has no final path segment to name the clone after"),
                "Use the full repository URL, e.g. https://github.com/org/repo.git".into(),
            ],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidSetting { .. } => ErrorCategory::Configuration,
            Self::RepositoryNameCollision { .. } | Self::UnderivableRepositoryName { .. } => {
                ErrorCategory::Composition
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Composition,
}
