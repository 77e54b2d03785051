use std::fmt;

use serde::Serialize;

use crate::domain::config::Configuration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    BuildManifest,
    OrchestrationManifest,
}

impl ArtifactKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BuildManifest => "build-manifest",
            Self::OrchestrationManifest => "orchestration-manifest",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendered text of one manifest plus the configuration it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub kind: ArtifactKind,
    pub text: String,
    pub derived_from: Configuration,
}

impl GeneratedArtifact {
    pub fn new(kind: ArtifactKind, text: String, derived_from: &Configuration) -> Self {
        Self {
            kind,
            text,
            derived_from: derived_from.clone(),
        }
    }
}
