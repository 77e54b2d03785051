//! `podgen config`: inspect the tool configuration.

use serde_json::Value;

use crate::{
    cli::ConfigCommands,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

pub fn execute(cmd: ConfigCommands, config: AppConfig, output: OutputManager) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => output.raw(&lookup(&config, &key)?)?,
        ConfigCommands::List if output.is_json() => output.json(&config)?,
        ConfigCommands::List => {
            let text = toml::to_string_pretty(&config).map_err(|e| CliError::ConfigError {
                message: format!("cannot encode configuration: {e}"),
                source: Some(Box::new(e)),
            })?;
            output.header(&format!("# {}", AppConfig::config_path().display()))?;
            output.raw(&text)?;
        }
        ConfigCommands::Path => output.raw(&AppConfig::config_path().display().to_string())?,
    }
    Ok(())
}

/// Value of a dotted key such as `engine.binary`, as it would be written in
/// the config file. Only leaf values can be read.
fn lookup(config: &AppConfig, key: &str) -> CliResult<String> {
    let unknown = || CliError::ConfigError {
        message: format!("unknown configuration key '{key}'"),
        source: None,
    };

    let tree = serde_json::to_value(config)?;
    let value = key
        .split('.')
        .try_fold(&tree, |node, part| node.get(part))
        .ok_or_else(unknown)?;

    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(_) | Value::Number(_) => Ok(value.to_string()),
        _ => Err(unknown()),
    }
}
