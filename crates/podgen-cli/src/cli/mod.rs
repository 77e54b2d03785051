//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "podgen",
    bin_name = "podgen",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Generate a container build manifest and compose file from one settings file",
    long_about = "podgen turns a flat KEY=value settings file into a multi-stage \
                  Podmanfile and a matching compose.yaml for a browser-accessible \
                  terminal container, and can publish the built image.",
    after_help = "EXAMPLES:\n\
        \x20 podgen init --name web-terminal --port 7681\n\
        \x20 podgen generate\n\
        \x20 podgen validate --output-format json\n\
        \x20 podgen push --dry-run",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write the build manifest only.
    #[command(
        name = "build-manifest",
        visible_alias = "podmanfile",
        about = "Generate the build manifest (Podmanfile)",
        after_help = "EXAMPLES:\n\
            \x20 podgen build-manifest\n\
            \x20 podgen build-manifest --stdout\n\
            \x20 podgen build-manifest --settings prod.env --output-dir build/"
    )]
    BuildManifest(GenerateArgs),

    /// Write the orchestration manifest only.
    #[command(
        about = "Generate the compose file",
        after_help = "EXAMPLES:\n\
            \x20 podgen compose\n\
            \x20 podgen compose --stdout"
    )]
    Compose(GenerateArgs),

    /// Write both manifests.
    #[command(
        visible_alias = "gen",
        about = "Generate the build manifest and the compose file",
        after_help = "EXAMPLES:\n\
            \x20 podgen generate\n\
            \x20 podgen generate --dry-run\n\
            \x20 podgen generate --output-dir deploy/"
    )]
    Generate(GenerateArgs),

    /// Check the settings without writing anything.
    #[command(
        about = "Validate the settings file",
        after_help = "EXAMPLES:\n\
            \x20 podgen validate\n\
            \x20 podgen validate --show-settings\n\
            \x20 podgen --output-format json validate"
    )]
    Validate(ValidateArgs),

    /// Show the tags a push would use.
    #[command(
        about = "Show the resolved image tags",
        after_help = "EXAMPLES:\n\
            \x20 podgen tags\n\
            \x20 podgen tags --tag v1.2.0\n\
            \x20 podgen --output-format json tags"
    )]
    Tags(TagsArgs),

    /// Tag and push the built image.
    #[command(
        about = "Push the built image to the registry",
        after_help = "EXAMPLES:\n\
            \x20 podgen push\n\
            \x20 podgen push --dry-run"
    )]
    Push(PushArgs),

    /// Write a commented settings file.
    #[command(
        about = "Create a settings file",
        after_help = "EXAMPLES:\n\
            \x20 podgen init\n\
            \x20 podgen init --name devbox --port 8080\n\
            \x20 podgen init --settings podgen.env --force"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 podgen completions bash > ~/.local/share/bash-completion/completions/podgen\n\
            \x20 podgen completions zsh  > ~/.zfunc/_podgen\n\
            \x20 podgen completions fish > ~/.config/fish/completions/podgen.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the podgen tool configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 podgen config get generate.output_dir\n\
            \x20 podgen config list\n\
            \x20 podgen config path"
    )]
    Config(ConfigCommands),
}

// ── shared ────────────────────────────────────────────────────────────────────

/// Where the settings come from.
#[derive(Debug, Clone, Args)]
pub struct SettingsArgs {
    /// Settings file (dotenv or `.toml`).
    #[arg(
        short = 's',
        long = "settings",
        value_name = "FILE",
        help = "Settings file (default: podgen.env)"
    )]
    pub settings: Option<PathBuf>,
}

// ── build-manifest / compose / generate ──────────────────────────────────────

/// Arguments shared by the generation commands.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Directory the manifests are written to.
    #[arg(
        short = 'o',
        long = "output-dir",
        value_name = "DIR",
        help = "Output directory (default: current directory)"
    )]
    pub output_dir: Option<PathBuf>,

    /// Print the manifests instead of writing them.
    #[arg(long = "stdout", help = "Print to stdout instead of writing files")]
    pub stdout: bool,

    /// Validate and compose, then report what would be written.
    #[arg(
        long = "dry-run",
        conflicts_with = "stdout",
        help = "Show what would be written without writing"
    )]
    pub dry_run: bool,
}

// ── validate ──────────────────────────────────────────────────────────────────

/// Arguments for `podgen validate`.
#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Also list every setting with its provenance.
    #[arg(long = "show-settings", help = "List every setting and where it came from")]
    pub show_settings: bool,
}

// ── tags ──────────────────────────────────────────────────────────────────────

/// Arguments for `podgen tags`.
#[derive(Debug, Args)]
pub struct TagsArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Use this tag instead of `REGISTRY_TAG`. A git revision still takes precedence.
    #[arg(long = "tag", value_name = "TAG", help = "Explicit version tag (a git revision still wins)")]
    pub tag: Option<String>,
}

// ── push ──────────────────────────────────────────────────────────────────────

/// Arguments for `podgen push`.
#[derive(Debug, Args)]
pub struct PushArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Resolve tags and references without contacting the registry.
    #[arg(long = "dry-run", help = "Show what would be pushed without pushing")]
    pub dry_run: bool,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `podgen init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Container name written into the file.
    #[arg(
        short = 'n',
        long = "name",
        value_name = "NAME",
        default_value = "web-terminal",
        help = "Container name"
    )]
    pub name: String,

    /// Port written into the file.
    #[arg(
        short = 'p',
        long = "port",
        value_name = "PORT",
        default_value_t = 7681,
        value_parser = clap::value_parser!(u16).range(1..),
        help = "Terminal port"
    )]
    pub port: u16,

    /// Overwrite an existing settings file.
    #[arg(short = 'f', long = "force", help = "Overwrite an existing settings file")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `podgen completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `podgen config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `generate.output_dir`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the default configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, Parser};

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_generate_command() {
        let cli = Cli::parse_from(["podgen", "generate", "--settings", "x.env", "-o", "out"]);
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.settings.settings, Some(PathBuf::from("x.env")));
                assert_eq!(args.output_dir, Some(PathBuf::from("out")));
                assert!(!args.stdout);
            }
            other => panic!("expected Generate, got {other:?}"),
        }
    }

    #[test]
    fn build_manifest_alias() {
        let cli = Cli::parse_from(["podgen", "podmanfile", "--stdout"]);
        assert!(matches!(cli.command, Commands::BuildManifest(ref a) if a.stdout));
    }

    #[test]
    fn stdout_and_dry_run_conflict() {
        let result = Cli::try_parse_from(["podgen", "generate", "--stdout", "--dry-run"]);
        assert!(result.is_err());
    }

    #[test]
    fn init_defaults() {
        let cli = Cli::parse_from(["podgen", "init"]);
        match cli.command {
            Commands::Init(args) => {
                assert_eq!(args.name, "web-terminal");
                assert_eq!(args.port, 7681);
                assert!(!args.force);
            }
            other => panic!("expected Init, got {other:?}"),
        }
    }

    #[test]
    fn init_rejects_port_zero() {
        assert!(Cli::try_parse_from(["podgen", "init", "--port", "0"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["podgen", "validate", "--output-format", "json", "-vv"]);
        assert_eq!(cli.global.output_format, OutputFormat::Json);
        assert_eq!(cli.global.verbose, 2);
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["podgen", "--quiet", "--verbose", "validate"]);
        assert!(result.is_err());
    }
}
