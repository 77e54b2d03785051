//! Command handlers.
//!
//! Each handler translates parsed arguments into calls on the core services
//! and prints the result. No business logic lives here.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use podgen_adapters::{GitRevision, SettingsLoader, SystemClock};
use podgen_core::{
    application::TagResolver,
    domain::{Configuration, ValidationIssue},
};

use crate::{error::CliResult, output::OutputManager};

pub mod completions;
pub mod config;
pub mod generate;
pub mod init;
pub mod push;
pub mod tags;
pub mod validate;

/// Read and parse the settings file.
#[instrument(skip_all, fields(path = %path.display()))]
pub(crate) fn load_settings(path: &Path) -> CliResult<Configuration> {
    let settings = SettingsLoader::new(path).load()?;
    debug!(name = %settings.name(), "Settings loaded");
    Ok(settings)
}

/// Tag resolver reading the revision of the repository that holds the
/// settings file.
pub(crate) fn tag_resolver(settings_path: &Path) -> TagResolver {
    TagResolver::new(
        Box::new(GitRevision::new(project_dir(settings_path))),
        Box::new(SystemClock),
    )
}

fn project_dir(settings_path: &Path) -> PathBuf {
    settings_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Print non-fatal validation issues.
pub(crate) fn show_warnings<'a>(
    warnings: impl IntoIterator<Item = &'a ValidationIssue>,
    output: &OutputManager,
) -> CliResult<()> {
    for issue in warnings {
        output.warning(&issue.to_string())?;
    }
    Ok(())
}
