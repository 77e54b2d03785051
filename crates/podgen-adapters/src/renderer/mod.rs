//! Manifest renderers.

mod compose;
mod podmanfile;

pub use compose::ComposeRenderer;
pub use podmanfile::{PodmanfileRenderer, render_instruction, render_stage};
