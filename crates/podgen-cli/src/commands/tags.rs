//! `podgen tags`: show the tags a push would use, without pushing.

use serde::Serialize;
use tracing::instrument;

use podgen_core::domain::{TagPair, TagSource};

use crate::{
    cli::TagsArgs,
    commands::{load_settings, tag_resolver},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct TagsOutput<'a> {
    version: &'a str,
    latest: &'a str,
    source: TagSource,
    /// Remote references, only when publishing is enabled.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    references: Vec<String>,
}

impl<'a> TagsOutput<'a> {
    fn new(tags: &'a TagPair, references: Vec<String>) -> Self {
        Self {
            version: tags.version.as_str(),
            latest: tags.latest.as_str(),
            source: tags.source,
            references,
        }
    }
}

#[instrument(skip_all)]
pub fn execute(args: TagsArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let settings_path = config.settings_file(args.settings.settings.as_deref());
    let settings = load_settings(&settings_path)?;

    let resolver = tag_resolver(&settings_path);
    let tags = match &args.tag {
        Some(explicit) => resolver.resolve(explicit),
        None => resolver.resolve_for(&settings),
    };

    let references = if settings.registry.is_enabled() {
        let remote = settings.registry.remote_repository();
        tags.in_push_order()
            .iter()
            .map(|tag| format!("{remote}:{tag}"))
            .collect()
    } else {
        Vec::new()
    };

    if output.is_json() {
        return output.json(&TagsOutput::new(&tags, references));
    }

    output.print(&format!("{}  ({})", tags.version, tags.source))?;
    output.print(&tags.latest.to_string())?;
    for reference in &references {
        output.info(&format!("would push {reference}"))?;
    }

    Ok(())
}
