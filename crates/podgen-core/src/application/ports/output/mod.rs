//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `podgen-adapters` crate provides implementations.

use std::path::Path;

use chrono::NaiveDateTime;

#[cfg(test)]
use mockall::automock;

use crate::application::error::PushError;
use crate::domain::{Configuration, Stage};
use crate::error::PodgenResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `podgen_adapters::filesystem::LocalFilesystem` (production)
/// - `podgen_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> PodgenResult<()>;

    /// Write content to a file, replacing it wholesale.
    fn write_file(&self, path: &Path, content: &str) -> PodgenResult<()>;

    fn exists(&self, path: &Path) -> bool;

    fn remove_file(&self, path: &Path) -> PodgenResult<()>;
}

/// Renders composed stages into the build-manifest text.
///
/// Must be total and deterministic: the same stages always give the same
/// bytes, in stage and instruction order.
#[cfg_attr(test, automock)]
pub trait BuildManifestRenderer: Send + Sync {
    fn render(&self, stages: &[Stage]) -> String;
}

/// Renders the orchestration manifest straight from the configuration.
#[cfg_attr(test, automock)]
pub trait OrchestrationRenderer: Send + Sync {
    fn render(&self, config: &Configuration) -> PodgenResult<String>;
}

/// Source-control revision lookup.
#[cfg_attr(test, automock)]
pub trait RevisionSource: Send + Sync {
    /// Short revision hash of the working tree, if there is one.
    fn short_revision(&self) -> Option<String>;
}

/// Wall clock, local time.
#[cfg_attr(test, automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// The external container engine used for publishing.
#[cfg_attr(test, automock)]
pub trait ContainerEngine: Send + Sync {
    /// Whether a local image reference exists.
    fn image_exists(&self, image: &str) -> Result<bool, PushError>;

    fn login(&self, registry: &str, username: &str, token: &str) -> Result<(), PushError>;

    fn tag(&self, source: &str, target: &str) -> Result<(), PushError>;

    fn push(&self, reference: &str) -> Result<(), PushError>;
}
