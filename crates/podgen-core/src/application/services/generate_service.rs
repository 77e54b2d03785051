//! Generate Service - validate, compose, render, write.
//!
//! Both manifests are rendered in memory before anything touches the
//! filesystem, so a validation or composition failure never leaves a file
//! behind. The two writes are not transactional: if the second write fails
//! the first file stays, and re-running generation is the recovery.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{BuildManifestRenderer, Filesystem, OrchestrationRenderer},
    },
    domain::{
        ArtifactKind, Composition, Configuration, GeneratedArtifact, ValidationIssue,
        ValidationReport, compose, validate,
    },
    error::PodgenResult,
};

/// Which artifacts a generation run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactSelection {
    BuildManifest,
    OrchestrationManifest,
    All,
}

impl ArtifactSelection {
    pub fn kinds(&self) -> &'static [ArtifactKind] {
        match self {
            Self::BuildManifest => &[ArtifactKind::BuildManifest],
            Self::OrchestrationManifest => &[ArtifactKind::OrchestrationManifest],
            Self::All => &[
                ArtifactKind::BuildManifest,
                ArtifactKind::OrchestrationManifest,
            ],
        }
    }
}

/// Where each artifact is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub build_manifest: PathBuf,
    pub orchestration_manifest: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(
        dir: impl AsRef<Path>,
        build_manifest: impl AsRef<Path>,
        orchestration_manifest: impl AsRef<Path>,
    ) -> Self {
        let dir = dir.as_ref();
        Self {
            build_manifest: dir.join(build_manifest),
            orchestration_manifest: dir.join(orchestration_manifest),
        }
    }

    pub fn path_for(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::BuildManifest => &self.build_manifest,
            ArtifactKind::OrchestrationManifest => &self.orchestration_manifest,
        }
    }
}

/// Rendered artifacts plus the non-fatal issues found on the way.
#[derive(Debug, Clone)]
pub struct Generation {
    pub warnings: Vec<ValidationIssue>,
    /// Stage names in manifest order; empty when only the orchestration
    /// manifest was requested.
    pub stages: Vec<String>,
    pub artifacts: Vec<GeneratedArtifact>,
}

impl Generation {
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&GeneratedArtifact> {
        self.artifacts.iter().find(|a| a.kind == kind)
    }
}

/// One file written by [`GenerateService::write`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub bytes: usize,
}

pub struct GenerateService {
    build_renderer: Box<dyn BuildManifestRenderer>,
    orchestration_renderer: Box<dyn OrchestrationRenderer>,
    filesystem: Box<dyn Filesystem>,
}

impl GenerateService {
    pub fn new(
        build_renderer: Box<dyn BuildManifestRenderer>,
        orchestration_renderer: Box<dyn OrchestrationRenderer>,
        filesystem: Box<dyn Filesystem>,
    ) -> Self {
        Self {
            build_renderer,
            orchestration_renderer,
            filesystem,
        }
    }

    /// Run every validation rule. Never fails; the report carries the issues.
    pub fn validate(&self, config: &Configuration) -> ValidationReport {
        validate(config)
    }

    /// Validate and compose without rendering.
    #[instrument(skip_all, fields(name = %config.name()))]
    pub fn plan(&self, config: &Configuration) -> PodgenResult<(ValidationReport, Composition)> {
        let report = self.gate(config)?;
        let composition = compose(config)?;
        Ok((report, composition))
    }

    /// Render the selected artifacts in memory.
    #[instrument(skip_all, fields(name = %config.name(), selection = ?selection))]
    pub fn render(
        &self,
        config: &Configuration,
        selection: ArtifactSelection,
    ) -> PodgenResult<Generation> {
        let report = self.gate(config)?;
        let mut stages = Vec::new();
        let mut artifacts = Vec::with_capacity(2);

        for kind in selection.kinds() {
            let text = match kind {
                ArtifactKind::BuildManifest => {
                    let composition = compose(config)?;
                    stages = composition
                        .stage_names()
                        .into_iter()
                        .map(str::to_owned)
                        .collect();
                    self.build_renderer.render(composition.stages())
                }
                ArtifactKind::OrchestrationManifest => {
                    self.orchestration_renderer.render(config)?
                }
            };
            debug!(artifact = %kind, bytes = text.len(), "Artifact rendered");
            artifacts.push(GeneratedArtifact::new(*kind, text, config));
        }

        Ok(Generation {
            warnings: report.warnings().cloned().collect(),
            stages,
            artifacts,
        })
    }

    /// Write rendered artifacts, each replacing its file wholesale.
    ///
    /// A file whose write fails is removed on a best-effort basis so no
    /// partial artifact is left behind.
    #[instrument(skip_all)]
    pub fn write(
        &self,
        generation: &Generation,
        paths: &ArtifactPaths,
    ) -> PodgenResult<Vec<WrittenArtifact>> {
        let mut written = Vec::with_capacity(generation.artifacts.len());

        for artifact in &generation.artifacts {
            let path = paths.path_for(artifact.kind);

            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                self.filesystem.create_dir_all(parent)?;
            }

            if let Err(e) = self.filesystem.write_file(path, &artifact.text) {
                warn!(path = %path.display(), error = %e, "Write failed, removing partial file");
                self.discard(path);
                if !written.is_empty() {
                    warn!("Manifests are out of sync until generation is re-run");
                }
                return Err(e);
            }

            info!(artifact = %artifact.kind, path = %path.display(), "Wrote artifact");
            written.push(WrittenArtifact {
                kind: artifact.kind,
                path: path.to_path_buf(),
                bytes: artifact.text.len(),
            });
        }

        Ok(written)
    }

    /// Render then write.
    pub fn generate(
        &self,
        config: &Configuration,
        selection: ArtifactSelection,
        paths: &ArtifactPaths,
    ) -> PodgenResult<(Generation, Vec<WrittenArtifact>)> {
        let generation = self.render(config, selection)?;
        let written = self.write(&generation, paths)?;
        Ok((generation, written))
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    /// Fatal issues stop the run; warnings are logged and passed on.
    fn gate(&self, config: &Configuration) -> PodgenResult<ValidationReport> {
        let report = validate(config);

        for issue in report.warnings() {
            warn!(key = %issue.key, "{}", issue.message);
        }

        if !report.is_valid() {
            return Err(ApplicationError::InvalidConfiguration {
                issues: report.errors().cloned().collect(),
            }
            .into());
        }

        Ok(report)
    }

    fn discard(&self, path: &Path) {
        if !self.filesystem.exists(path) {
            return;
        }
        if let Err(e) = self.filesystem.remove_file(path) {
            warn!(error = %e, path = %path.display(), "Cleanup failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::*;

    use super::*;
    use crate::application::ports::{
        MockBuildManifestRenderer, MockFilesystem, MockOrchestrationRenderer,
    };
    use crate::error::{ErrorCategory, PodgenError};

    fn minimal() -> Configuration {
        Configuration::builder().name("web-terminal").port(7681).build()
    }

    fn renderers() -> (MockBuildManifestRenderer, MockOrchestrationRenderer) {
        let mut build = MockBuildManifestRenderer::new();
        build
            .expect_render()
            .returning(|stages| format!("{} stages\n", stages.len()));
        let mut orchestration = MockOrchestrationRenderer::new();
        orchestration
            .expect_render()
            .returning(|config| Ok(format!("services: {}\n", config.name())));
        (build, orchestration)
    }

    fn paths() -> ArtifactPaths {
        ArtifactPaths::in_dir("/out", "Podmanfile", "compose.yaml")
    }

    #[test]
    fn invalid_config_never_reaches_renderers_or_disk() {
        let mut build = MockBuildManifestRenderer::new();
        build.expect_render().never();
        let mut orchestration = MockOrchestrationRenderer::new();
        orchestration.expect_render().never();
        let mut fs = MockFilesystem::new();
        fs.expect_write_file().never();
        fs.expect_create_dir_all().never();

        let service = GenerateService::new(Box::new(build), Box::new(orchestration), Box::new(fs));
        let config = Configuration::builder()
            .port(7681)
            .registry("alice", "", "terminal")
            .build();

        let err = service
            .generate(&config, ArtifactSelection::All, &paths())
            .unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Validation);
        match err {
            PodgenError::Application(ApplicationError::InvalidConfiguration { issues }) => {
                assert_eq!(issues.len(), 2)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn composition_error_aborts_before_writing() {
        let (build, orchestration) = renderers();
        let mut fs = MockFilesystem::new();
        fs.expect_write_file().never();

        let service = GenerateService::new(Box::new(build), Box::new(orchestration), Box::new(fs));
        let config = Configuration::builder()
            .name("web-terminal")
            .port(7681)
            .clone_repositories(["https://host/org/foo", "https://host/org2/foo.git"])
            .build();

        let err = service
            .generate(&config, ArtifactSelection::All, &paths())
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Composition);
    }

    #[test]
    fn all_writes_both_files_in_order() {
        let (build, orchestration) = renderers();
        let mut fs = MockFilesystem::new();
        let mut seq = mockall::Sequence::new();
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_write_file()
            .with(eq(Path::new("/out/Podmanfile")), eq("4 stages\n"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        fs.expect_write_file()
            .with(eq(Path::new("/out/compose.yaml")), always())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let service = GenerateService::new(Box::new(build), Box::new(orchestration), Box::new(fs));
        let config = Configuration::builder()
            .name("web-terminal")
            .port(7681)
            .clone_repositories(["https://host/a/one"])
            .build();

        let (generation, written) = service
            .generate(&config, ArtifactSelection::All, &paths())
            .unwrap();

        assert_eq!(generation.stages, vec!["base", "build", "clone", "runtime"]);
        assert_eq!(written.len(), 2);
        assert_eq!(written[1].kind, ArtifactKind::OrchestrationManifest);
    }

    #[test]
    fn failed_write_removes_the_partial_file() {
        let (build, orchestration) = renderers();
        let mut fs = MockFilesystem::new();
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_write_file().returning(|path, _| {
            Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "disk full".into(),
            }
            .into())
        });
        fs.expect_exists().return_const(true);
        fs.expect_remove_file()
            .with(eq(Path::new("/out/Podmanfile")))
            .times(1)
            .returning(|_| Ok(()));

        let service = GenerateService::new(Box::new(build), Box::new(orchestration), Box::new(fs));
        let err = service
            .generate(&minimal(), ArtifactSelection::BuildManifest, &paths())
            .unwrap_err();
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn warnings_do_not_block_generation() {
        let (build, orchestration) = renderers();
        let service = GenerateService::new(
            Box::new(build),
            Box::new(orchestration),
            Box::new(MockFilesystem::new()),
        );
        let config = Configuration::builder()
            .name("web-terminal")
            .port(7681)
            .build_proxy("", "", "")
            .build();

        let generation = service
            .render(&config, ArtifactSelection::OrchestrationManifest)
            .unwrap();
        assert_eq!(generation.warnings.len(), 1);
        assert!(generation.stages.is_empty());
        assert_eq!(
            generation
                .artifact(ArtifactKind::OrchestrationManifest)
                .unwrap()
                .text,
            "services: web-terminal\n"
        );
    }

    #[test]
    fn plan_reports_stage_order() {
        let (build, orchestration) = renderers();
        let service = GenerateService::new(
            Box::new(build),
            Box::new(orchestration),
            Box::new(MockFilesystem::new()),
        );
        let (report, composition) = service.plan(&minimal()).unwrap();
        assert!(report.issues.is_empty());
        assert_eq!(composition.stage_names(), vec!["base", "build", "runtime"]);
    }
}
