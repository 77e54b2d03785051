//! Core domain layer for podgen.
//!
//! Pure logic only: the configuration model, validation rules, the
//! stage/instruction model with its composer, and tag resolution. Rendering
//! and every kind of I/O live behind the ports in `crate::application`.
//!
//! ## Flow
//!
//! ```text
//! Configuration ──validate──▶ ValidationReport (must have no errors)
//!       │
//!       ├──compose──▶ Composition (base → build → [clone] → runtime)
//!       │
//!       └───────────▶ orchestration manifest (rendered by an adapter)
//! ```

pub mod artifact;
pub mod composer;
pub mod config;
pub mod contract;
pub mod error;
pub mod settings;
pub mod stage;
pub mod tag;
pub mod validation;

pub use artifact::{ArtifactKind, GeneratedArtifact};
pub use composer::{Composition, compose, repository_dir_name};
pub use config::{
    CloneGroup, Configuration, ConfigurationBuilder, PackageGroup, ProxyGroup, RegistryGroup,
};
pub use error::{DomainError, ErrorCategory};
pub use settings::{Provenance, Setting, keys};
pub use stage::{Instruction, PackageManager, Parent, Stage};
pub use tag::{Tag, TagPair, TagSource, resolve_version_tag};
pub use validation::{
    ConfigValidator, Severity, ValidationIssue, ValidationReport, ValidationRule, validate,
};

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Settings → Validation → Composition
    // ========================================================================

    #[test]
    fn settings_flow_through_to_stages() {
        let config = Configuration::from_pairs([
            ("CONTAINER_NAME", "web-terminal"),
            ("PORT", "7681"),
            ("CLONE_ENABLED", "on"),
            ("CLONE_REPOS", "https://host/a/one https://host/b/two.git"),
        ])
        .unwrap();

        assert!(validate(&config).is_valid());
        let composition = compose(&config).unwrap();
        assert_eq!(
            composition.stage_names(),
            vec!["base", "build", "clone", "runtime"]
        );
    }

    #[test]
    fn clone_stage_only_when_enabled() {
        let config = Configuration::from_pairs([
            ("CONTAINER_NAME", "web-terminal"),
            ("PORT", "7681"),
            ("CLONE_ENABLED", "false"),
            ("CLONE_REPOS", "https://host/a/one"),
        ])
        .unwrap();

        let composition = compose(&config).unwrap();
        assert!(composition.stage("clone").is_none());
        assert!(composition.stages().iter().all(|s| {
            s.instructions()
                .iter()
                .all(|i| !matches!(i, Instruction::CopyFromStage { stage, .. } if stage == "clone"))
        }));
    }

    #[test]
    fn runtime_is_always_last() {
        for clone in ["true", "false"] {
            let config = Configuration::from_pairs([
                ("CONTAINER_NAME", "t"),
                ("PORT", "80"),
                ("CLONE_ENABLED", clone),
                ("CLONE_REPOS", "https://h/x/y"),
            ])
            .unwrap();
            let composition = compose(&config).unwrap();
            assert_eq!(composition.stages().last().unwrap().name(), "runtime");
            assert_eq!(composition.stages()[0].name(), "base");
            assert!(composition.is_linear());
        }
    }
}
