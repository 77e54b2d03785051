//! Integration tests for podgen-core, using hand-written port doubles.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use podgen_core::{
    application::{ApplicationError, ArtifactPaths, ArtifactSelection, GenerateService, ports::*},
    domain::{Configuration, Instruction, Stage},
    error::{PodgenError, PodgenResult},
};

#[derive(Clone, Default)]
struct RecordingFs {
    files: Arc<Mutex<BTreeMap<PathBuf, String>>>,
}

impl Filesystem for RecordingFs {
    fn create_dir_all(&self, _path: &Path) -> PodgenResult<()> {
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> PodgenResult<()> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_owned());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn remove_file(&self, path: &Path) -> PodgenResult<()> {
        self.files.lock().unwrap().remove(path);
        Ok(())
    }
}

/// One line per stage: `name<parent:count`.
struct OutlineRenderer;

impl BuildManifestRenderer for OutlineRenderer {
    fn render(&self, stages: &[Stage]) -> String {
        stages
            .iter()
            .map(|s| format!("{}<{}:{}\n", s.name(), s.parent(), s.instructions().len()))
            .collect()
    }
}

struct PortRenderer;

impl OrchestrationRenderer for PortRenderer {
    fn render(&self, config: &Configuration) -> PodgenResult<String> {
        Ok(format!("{0}:{0}\n", config.port()))
    }
}

fn service(fs: &RecordingFs) -> GenerateService {
    GenerateService::new(
        Box::new(OutlineRenderer),
        Box::new(PortRenderer),
        Box::new(fs.clone()),
    )
}

#[test]
fn test_generate_all_writes_both_artifacts() {
    let fs = RecordingFs::default();
    let config = Configuration::from_pairs([("CONTAINER_NAME", "web-terminal"), ("PORT", "7681")])
        .unwrap();
    let paths = ArtifactPaths::in_dir("/out", "Podmanfile", "compose.yaml");

    service(&fs)
        .generate(&config, ArtifactSelection::All, &paths)
        .unwrap();

    let files = fs.files.lock().unwrap();
    let manifest = &files[Path::new("/out/Podmanfile")];
    assert_eq!(manifest.lines().count(), 3);
    assert!(manifest.starts_with("base<docker.io/library/ubuntu:24.04"));
    assert_eq!(files[Path::new("/out/compose.yaml")], "7681:7681\n");
}

#[test]
fn test_validation_failure_writes_nothing() {
    let fs = RecordingFs::default();
    let config = Configuration::from_pairs([("PORT", "7681")]).unwrap();
    let paths = ArtifactPaths::in_dir("/out", "Podmanfile", "compose.yaml");

    let err = service(&fs)
        .generate(&config, ArtifactSelection::All, &paths)
        .unwrap_err();

    assert!(matches!(
        err,
        PodgenError::Application(ApplicationError::InvalidConfiguration { .. })
    ));
    assert!(fs.files.lock().unwrap().is_empty());
}

#[test]
fn test_build_manifest_only_leaves_compose_untouched() {
    let fs = RecordingFs::default();
    let config = Configuration::from_pairs([("CONTAINER_NAME", "web-terminal"), ("PORT", "7681")])
        .unwrap();
    let paths = ArtifactPaths::in_dir("/out", "Podmanfile", "compose.yaml");

    service(&fs)
        .generate(&config, ArtifactSelection::BuildManifest, &paths)
        .unwrap();

    assert!(fs.exists(Path::new("/out/Podmanfile")));
    assert!(!fs.exists(Path::new("/out/compose.yaml")));
}

#[test]
fn test_regeneration_is_byte_identical() {
    let config = Configuration::from_pairs([
        ("CONTAINER_NAME", "web-terminal"),
        ("PORT", "7681"),
        ("BUILD_PROXY_ENABLED", "true"),
        ("BUILD_HTTP_PROXY", "http://proxy:3128"),
        ("EXTRA_APT_PACKAGES", "jq htop jq"),
    ])
    .unwrap();
    let fs = RecordingFs::default();
    let service = service(&fs);

    let first = service.render(&config, ArtifactSelection::All).unwrap();
    let second = service.render(&config, ArtifactSelection::All).unwrap();

    for (a, b) in first.artifacts.iter().zip(&second.artifacts) {
        assert_eq!(a.text, b.text);
    }
}

#[test]
fn test_plan_exposes_port_in_runtime() {
    let fs = RecordingFs::default();
    let config = Configuration::from_pairs([("CONTAINER_NAME", "web-terminal"), ("PORT", "8080")])
        .unwrap();

    let (_, composition) = service(&fs).plan(&config).unwrap();
    let runtime = composition.stage("runtime").unwrap();
    assert_eq!(runtime.exposed_port(), Some(8080));
    assert!(
        runtime
            .instructions()
            .iter()
            .any(|i| matches!(i, Instruction::SetWorkingDirectory(dir) if dir == "/workspace"))
    );
}
