//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `podgen-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: artifact writes
//!   - `BuildManifestRenderer` / `OrchestrationRenderer`: manifest text
//!   - `RevisionSource` / `Clock`: inputs to tag resolution
//!   - `ContainerEngine`: login, tag and push
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use output::{
    BuildManifestRenderer, Clock, ContainerEngine, Filesystem, OrchestrationRenderer,
    RevisionSource,
};

#[cfg(test)]
pub use output::{
    MockBuildManifestRenderer, MockClock, MockContainerEngine, MockFilesystem,
    MockOrchestrationRenderer, MockRevisionSource,
};
