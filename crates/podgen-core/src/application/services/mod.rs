//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "generate manifests" or "publish the image".

pub mod generate_service;
pub mod publish_service;
pub mod tag_resolver;

pub use generate_service::{
    ArtifactPaths, ArtifactSelection, GenerateService, Generation, WrittenArtifact,
};
pub use publish_service::{PublishService, PushPlan, PushReport, TagOutcome};
pub use tag_resolver::TagResolver;
