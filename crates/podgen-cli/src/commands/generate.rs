//! `podgen build-manifest`, `podgen compose` and `podgen generate`.
//!
//! All three share one handler; only the artifact selection differs.

use tracing::{info, instrument};

use podgen_adapters::{ComposeRenderer, LocalFilesystem, PodmanfileRenderer};
use podgen_core::application::{ArtifactPaths, ArtifactSelection, GenerateService};

use crate::{
    cli::GenerateArgs,
    commands::{load_settings, show_warnings},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// Generate the selected artifacts.
///
/// Dispatch sequence:
/// 1. Load the settings file
/// 2. `--dry-run`: validate and compose, then describe the writes
/// 3. Render in memory (validation gate included)
/// 4. `--stdout`: print instead of writing
/// 5. Write and report each file
#[instrument(skip_all, fields(selection = ?selection))]
pub fn execute(
    selection: ArtifactSelection,
    args: GenerateArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let settings_path = config.settings_file(args.settings.settings.as_deref());
    let settings = load_settings(&settings_path)?;

    let output_dir = config.output_dir(args.output_dir.as_deref());
    let paths = ArtifactPaths::in_dir(
        &output_dir,
        &config.generate.build_manifest,
        &config.generate.compose_file,
    );
    let service = service(&config);

    if args.dry_run {
        let (report, composition) = service.plan(&settings)?;
        show_warnings(report.warnings(), &output)?;

        output.info(&format!(
            "Dry run: '{}' from {}",
            settings.name(),
            settings_path.display()
        ))?;
        for stage in composition.stages() {
            output.info(&format!("  stage {:<8} from {}", stage.name(), stage.parent()))?;
        }
        for kind in selection.kinds() {
            output.info(&format!(
                "  would write {kind} to {}",
                paths.path_for(*kind).display()
            ))?;
        }
        return Ok(());
    }

    let generation = service.render(&settings, selection)?;
    show_warnings(&generation.warnings, &output)?;

    if args.stdout {
        for (i, artifact) in generation.artifacts.iter().enumerate() {
            if i > 0 {
                output.raw("")?;
            }
            output.raw(&artifact.text)?;
        }
        return Ok(());
    }

    let written = service.write(&generation, &paths)?;
    info!(count = written.len(), "Generation completed");

    for file in &written {
        output.success(&format!(
            "Wrote {} ({} bytes)",
            file.path.display(),
            file.bytes
        ))?;
    }
    if !generation.stages.is_empty() {
        output.print(&format!("  Stages: {}", generation.stages.join(" -> ")))?;
    }

    Ok(())
}

fn service(config: &AppConfig) -> GenerateService {
    GenerateService::new(
        Box::new(PodmanfileRenderer::new()),
        Box::new(ComposeRenderer::new(config.generate.build_manifest.clone())),
        Box::new(LocalFilesystem::new()),
    )
}
