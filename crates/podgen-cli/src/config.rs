//! Tool configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  It
//! describes how the `podgen` binary behaves (where files go, which engine
//! to run); the generator settings themselves live in the settings file
//! and never pass through here.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. `PODGEN_*` environment variables, `__` between sections
//!    (`PODGEN_GENERATE__OUTPUT_DIR=build`)
//! 3. Config file (`--config`, else the platform config directory)
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "PODGEN";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where settings are read from and manifests are written to.
    pub generate: GenerateConfig,
    /// Container engine used by `push`.
    pub engine: EngineConfig,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    pub settings_file: PathBuf,
    pub output_dir: PathBuf,
    pub build_manifest: String,
    pub compose_file: String,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            settings_file: PathBuf::from("podgen.env"),
            output_dir: PathBuf::from("."),
            build_manifest: "Podmanfile".into(),
            compose_file: "compose.yaml".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub binary: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: "podman".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    /// `auto`, `human`, `plain` or `json`; `--output-format` wins.
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the file, then the environment.
    ///
    /// An explicit `config_file` must exist; the default location is
    /// optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let defaults =
            config::Config::try_from(&Self::default()).context("encoding default configuration")?;

        let file = match config_file {
            Some(path) => config::File::from(path.as_path()).required(true),
            None => config::File::from(Self::config_path()).required(false),
        };

        let merged = config::Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("reading configuration")?;

        let cfg: Self = merged
            .try_deserialize()
            .context("configuration has an unexpected shape")?;
        debug!(?cfg, "Configuration loaded");
        Ok(cfg)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.podgen.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "podgen", "podgen")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".podgen.toml"))
    }

    /// Settings file to use when `--settings` is not given.
    pub fn settings_file(&self, flag: Option<&Path>) -> PathBuf {
        flag.map_or_else(|| self.generate.settings_file.clone(), Path::to_path_buf)
    }

    /// Output directory to use when `--output-dir` is not given.
    pub fn output_dir(&self, flag: Option<&Path>) -> PathBuf {
        flag.map_or_else(|| self.generate.output_dir.clone(), Path::to_path_buf)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_documented_file_names() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.generate.settings_file, PathBuf::from("podgen.env"));
        assert_eq!(cfg.generate.build_manifest, "Podmanfile");
        assert_eq!(cfg.generate.compose_file, "compose.yaml");
        assert_eq!(cfg.engine.binary, "podman");
    }

    #[test]
    fn default_no_color_is_false() {
        assert!(!AppConfig::default().output.no_color);
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("podgen.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[generate]\noutput_dir = \"build\"\n\n[engine]\nbinary = \"docker\"").unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.generate.output_dir, PathBuf::from("build"));
        assert_eq!(cfg.engine.binary, "docker");
        // Untouched keys keep their defaults.
        assert_eq!(cfg.generate.build_manifest, "Podmanfile");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = PathBuf::from("/definitely/not/here/podgen.toml");
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn flags_win_over_config() {
        let cfg = AppConfig::default();
        assert_eq!(
            cfg.settings_file(Some(Path::new("other.env"))),
            PathBuf::from("other.env")
        );
        assert_eq!(cfg.settings_file(None), PathBuf::from("podgen.env"));
        assert_eq!(cfg.output_dir(None), PathBuf::from("."));
    }

    #[test]
    fn config_path_is_not_empty() {
        let p = AppConfig::config_path();
        assert!(!p.as_os_str().is_empty());
    }
}
