//! `podgen init`: write a commented settings file.

use tracing::{info, instrument};

use podgen_adapters::{LocalFilesystem, settings_template};
use podgen_core::application::Filesystem;

use crate::{
    cli::InitArgs,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Create a settings file listing every key, with name and port filled in.
#[instrument(skip_all, fields(name = %args.name, port = args.port))]
pub fn execute(args: InitArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let path = config.settings_file(args.settings.settings.as_deref());
    let filesystem = LocalFilesystem::new();

    // Bail early if the file already exists and --force was not given.
    if filesystem.exists(&path) && !args.force {
        return Err(CliError::SettingsExists { path });
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        filesystem.create_dir_all(parent)?;
    }
    filesystem.write_file(&path, &settings_template(&args.name, args.port))?;
    info!(path = %path.display(), "Settings file written");

    output.success(&format!("Settings written to {}", path.display()))?;
    if !output.is_quiet() {
        output.print("")?;
        output.print("Next steps:")?;
        output.print(&format!("  $EDITOR {}", path.display()))?;
        output.print("  podgen generate")?;
    }

    Ok(())
}
