//! podgen Core - Hexagonal Architecture Implementation
//!
//! Domain and application layers for podgen, a generator that turns a flat
//! settings file into a multi-stage container build manifest and a matching
//! compose file, and publishes the built image.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            podgen-cli (CLI)             │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │ (GenerateService, PublishService, ...)  │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Filesystem, Renderers, Engine, Clock)  │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     podgen-adapters (Infrastructure)    │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │ (Configuration, Validator, Composer)    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use podgen_core::prelude::*;
//!
//! let config = Configuration::from_pairs([("CONTAINER_NAME", "web-terminal"), ("PORT", "7681")])
//!     .unwrap();
//!
//! // Adapters are injected by the caller.
//! let service = GenerateService::new(build_renderer, compose_renderer, filesystem);
//! let paths = ArtifactPaths::in_dir(".", "Podmanfile", "compose.yaml");
//! service.generate(&config, ArtifactSelection::All, &paths).unwrap();
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ArtifactPaths, ArtifactSelection, GenerateService, PublishService, TagResolver,
        ports::{
            BuildManifestRenderer, Clock, ContainerEngine, Filesystem, OrchestrationRenderer,
            RevisionSource,
        },
    };
    pub use crate::domain::{
        ArtifactKind, Composition, Configuration, Instruction, Stage, TagPair, ValidationReport,
    };
    pub use crate::error::{PodgenError, PodgenResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
