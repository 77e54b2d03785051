//! Container engine adapters.

mod podman;

pub use podman::PodmanEngine;
