//! Unified error handling for podgen core.
//!
//! Wraps domain and application errors in one type so callers can render
//! suggestions and pick an exit code without matching every layer.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::{self, DomainError};

/// Root error type for podgen core operations.
#[derive(Debug, Error, Clone)]
pub enum PodgenError {
    /// Business rule violations (bad settings, clone name collisions).
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Orchestration failures (validation gate, I/O, rendering, push setup).
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl PodgenError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Internal { .. } => vec![
                "This appears to be a bug in podgen".into(),
                "Re-run with -vvv and include the log when reporting it".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                domain::ErrorCategory::Configuration => ErrorCategory::Configuration,
                domain::ErrorCategory::Composition => ErrorCategory::Composition,
            },
            Self::Application(e) => e.category(),
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The settings failed validation.
    Validation,
    /// A settings value or settings file is unusable.
    Configuration,
    /// Stages could not be composed from otherwise valid settings.
    Composition,
    NotFound,
    Push,
    Internal,
}

/// Convenient result type alias.
pub type PodgenResult<T> = Result<T, PodgenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_categories_carry_through() {
        let err: PodgenError = DomainError::UnderivableRepositoryName {
            url: "https://host/".into(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Composition);
        assert!(!err.suggestions().is_empty());
    }
}
