//! `podgen push`: log in, tag and push the built image.

use serde::Serialize;
use tracing::{info, instrument};

use podgen_adapters::PodmanEngine;
use podgen_core::application::{PublishService, PushPlan, PushReport};

use crate::{
    cli::PushArgs,
    commands::{load_settings, tag_resolver},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct PushOutput<'a> {
    plan: &'a PushPlan,
    outcomes: Vec<OutcomeOutput<'a>>,
}

#[derive(Debug, Serialize)]
struct OutcomeOutput<'a> {
    tag: &'a str,
    reference: &'a str,
    pushed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Push both tags of the configured image.
///
/// Dispatch sequence:
/// 1. Load the settings file
/// 2. `--dry-run`: resolve and print the plan, touch nothing
/// 3. Check the engine can be started
/// 4. Publish, reporting every tag separately
/// 5. Exit with the push failure code if any tag failed
#[instrument(skip_all)]
pub fn execute(args: PushArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let settings_path = config.settings_file(args.settings.settings.as_deref());
    let settings = load_settings(&settings_path)?;

    let engine = PodmanEngine::new(config.engine.binary.clone());

    if args.dry_run {
        let service = PublishService::new(Box::new(engine), tag_resolver(&settings_path));
        let plan = service.plan(&settings)?;
        return show_plan(&plan, &output);
    }

    engine.ensure_available()?;
    let service = PublishService::new(Box::new(engine), tag_resolver(&settings_path));

    let spinner = output.spinner(format!("Pushing {}", settings.name()));
    let result = service.publish(&settings);
    spinner.finish_and_clear();
    let report = result?;

    if output.is_json() {
        output.json(&push_output(&report))?;
    } else {
        for outcome in &report.outcomes {
            match &outcome.error {
                None => output.success(&format!("Pushed {}", outcome.reference))?,
                Some(e) => output.error(&format!("{}: {e}", outcome.reference))?,
            }
        }
    }

    if report.is_success() {
        info!(version = %report.plan.tags.version, "Push completed");
        return Ok(());
    }

    let mut suggestions: Vec<String> = Vec::new();
    for outcome in report.failures() {
        for suggestion in outcome.error.iter().flat_map(|e| e.suggestions()) {
            if !suggestions.contains(&suggestion) {
                suggestions.push(suggestion);
            }
        }
    }

    Err(CliError::PushFailed {
        failed: report.failures().count(),
        total: report.outcomes.len(),
        suggestions,
    })
}

fn show_plan(plan: &PushPlan, output: &OutputManager) -> CliResult<()> {
    if output.is_json() {
        return output.json(plan);
    }

    output.info(&format!(
        "Dry run: would push {} to {}",
        plan.local_image, plan.registry
    ))?;
    output.print(&format!(
        "  version tag: {} ({})",
        plan.tags.version, plan.tags.source
    ))?;
    for reference in &plan.references {
        output.print(&format!("  {reference}"))?;
    }
    Ok(())
}

fn push_output(report: &PushReport) -> PushOutput<'_> {
    PushOutput {
        plan: &report.plan,
        outcomes: report
            .outcomes
            .iter()
            .map(|o| OutcomeOutput {
                tag: o.tag.as_str(),
                reference: &o.reference,
                pushed: o.is_success(),
                error: o.error.as_ref().map(ToString::to_string),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use podgen_core::{
        application::{PushError, TagOutcome},
        domain::{Tag, TagPair, TagSource},
    };

    use super::*;

    fn report() -> PushReport {
        let tags = TagPair {
            version: Tag::versioned("abc1234"),
            latest: Tag::latest(),
            source: TagSource::Revision,
        };
        PushReport {
            plan: PushPlan {
                local_image: "web-terminal:latest".into(),
                registry: "docker.io".into(),
                tags: tags.clone(),
                references: vec![
                    "docker.io/alice/terminal:abc1234".into(),
                    "docker.io/alice/terminal:latest".into(),
                ],
            },
            outcomes: vec![
                TagOutcome {
                    tag: tags.version.clone(),
                    reference: "docker.io/alice/terminal:abc1234".into(),
                    error: None,
                },
                TagOutcome {
                    tag: tags.latest.clone(),
                    reference: "docker.io/alice/terminal:latest".into(),
                    error: Some(PushError::Network {
                        reason: "connection reset".into(),
                    }),
                },
            ],
        }
    }

    #[test]
    fn json_output_reports_each_tag() {
        let report = report();
        let value = serde_json::to_value(push_output(&report)).unwrap();

        let outcomes = value["outcomes"].as_array().unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0]["pushed"], true);
        assert!(outcomes[0].get("error").is_none());
        assert_eq!(outcomes[1]["pushed"], false);
        assert!(
            outcomes[1]["error"]
                .as_str()
                .unwrap()
                .contains("connection reset")
        );
        assert_eq!(value["plan"]["tags"]["source"], "revision");
    }
}
