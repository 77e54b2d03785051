//! Infrastructure adapters for podgen.
//!
//! This crate implements the ports defined in `podgen-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod engine;
pub mod filesystem;
pub mod renderer;
pub mod revision;
pub mod settings_loader;

// Re-export commonly used adapters
pub use engine::PodmanEngine;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use renderer::{ComposeRenderer, PodmanfileRenderer};
pub use revision::{GitRevision, SystemClock};
pub use settings_loader::{SettingsLoader, settings_template};
