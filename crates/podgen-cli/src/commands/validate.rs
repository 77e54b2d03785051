//! `podgen validate`: check the settings without writing anything.

use std::path::Path;

use serde::Serialize;
use tracing::instrument;

use podgen_core::{
    application::ApplicationError,
    domain::{Configuration, Provenance, ValidationIssue, compose, validate},
    error::PodgenError,
};

use crate::{
    cli::ValidateArgs,
    commands::{load_settings, show_warnings},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// JSON shape of a validation run.
#[derive(Debug, Serialize)]
struct ValidationOutput<'a> {
    settings_file: String,
    valid: bool,
    issues: &'a [ValidationIssue],
    stages: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    settings: Option<Vec<SettingOutput>>,
}

#[derive(Debug, Serialize)]
struct SettingOutput {
    key: &'static str,
    value: String,
    provenance: Provenance,
}

#[instrument(skip_all)]
pub fn execute(args: ValidateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let settings_path = config.settings_file(args.settings.settings.as_deref());
    let settings = load_settings(&settings_path)?;

    let report = validate(&settings);
    // Composition can still fail on valid settings (clone name collisions).
    let composition = if report.is_valid() {
        Some(compose(&settings).map_err(PodgenError::from)?)
    } else {
        None
    };

    if output.is_json() {
        output.json(&ValidationOutput {
            settings_file: settings_path.display().to_string(),
            valid: report.is_valid(),
            issues: &report.issues,
            stages: composition
                .as_ref()
                .map(|c| c.stage_names())
                .unwrap_or_default(),
            settings: args.show_settings.then(|| setting_rows(&settings)),
        })?;
    } else {
        show_warnings(report.warnings(), &output)?;
        if args.show_settings {
            show_settings(&settings, &settings_path, &output)?;
        }
        if let Some(composition) = &composition {
            output.success(&format!(
                "{} is valid ({} stages: {})",
                settings_path.display(),
                composition.stages().len(),
                composition.stage_names().join(", ")
            ))?;
        }
    }

    if !report.is_valid() {
        return Err(CliError::Core(
            ApplicationError::InvalidConfiguration {
                issues: report.errors().cloned().collect(),
            }
            .into(),
        ));
    }

    Ok(())
}

fn setting_rows(settings: &Configuration) -> Vec<SettingOutput> {
    settings
        .entries()
        .into_iter()
        .map(|(key, value, provenance)| SettingOutput {
            key,
            value,
            provenance,
        })
        .collect()
}

fn show_settings(settings: &Configuration, path: &Path, output: &OutputManager) -> CliResult<()> {
    output.header(&format!("Settings ({})", path.display()))?;
    for row in setting_rows(settings) {
        output.print(&format!(
            "  {:<22} {:<9} {}",
            row.key,
            row.provenance.as_str(),
            row.value
        ))?;
    }
    output.print("")?;
    Ok(())
}
