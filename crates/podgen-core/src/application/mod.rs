//! Application layer for podgen.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (GenerateService, PublishService, TagResolver)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business logic itself. All business rules live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    ArtifactPaths, ArtifactSelection, GenerateService, Generation, PublishService, PushPlan,
    PushReport, TagOutcome, TagResolver, WrittenArtifact,
};

pub use ports::{
    BuildManifestRenderer, Clock, ContainerEngine, Filesystem, OrchestrationRenderer,
    RevisionSource,
};

pub use error::{ApplicationError, PushError};
