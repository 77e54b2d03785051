//! Output management and formatting.

use std::borrow::Cow;
use std::io::{self, IsTerminal};
use std::time::Duration;

use clap::ValueEnum;
use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::{AnsiColors, OwoColorize};
use serde::Serialize;

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;
use crate::error::CliResult;

/// Manages CLI output based on configuration.
pub struct OutputManager {
    resolved_format: OutputFormat,
    quiet: bool,
    no_color: bool,
    term: Term,
}

impl OutputManager {
    /// Build an `OutputManager` from parsed CLI flags and loaded config.
    ///
    /// `--output-format` wins; when it is `auto` the config file's format is
    /// used, and a remaining `auto` resolves by whether stdout is a TTY.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        let requested = match args.output_format {
            OutputFormat::Auto => {
                OutputFormat::from_str(&config.output.format, true).unwrap_or(OutputFormat::Auto)
            }
            explicit => explicit,
        };

        let resolved_format = if requested == OutputFormat::Auto {
            if io::stdout().is_terminal() {
                OutputFormat::Human
            } else {
                OutputFormat::Plain
            }
        } else {
            requested
        };

        Self {
            resolved_format,
            quiet: args.quiet,
            no_color: args.no_color
                || config.output.no_color
                || resolved_format != OutputFormat::Human,
            term: Term::stdout(),
        }
    }

    /// Status line; suppressed in quiet mode.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    /// Command output proper (a manifest on `--stdout`). Never suppressed.
    pub fn raw(&self, text: &str) -> io::Result<()> {
        self.term.write_str(text)?;
        if !text.ends_with('\n') {
            self.term.write_line("")?;
        }
        Ok(())
    }

    /// Pretty JSON on stdout. Never suppressed.
    pub fn json<T: Serialize>(&self, value: &T) -> CliResult<()> {
        let text = serde_json::to_string_pretty(value)?;
        self.term.write_line(&text)?;
        Ok(())
    }

    pub fn success(&self, msg: &str) -> io::Result<()> {
        self.marked(Mark::Success, msg)
    }

    /// Shown even in quiet mode.
    pub fn error(&self, msg: &str) -> io::Result<()> {
        self.marked(Mark::Error, msg)
    }

    pub fn warning(&self, msg: &str) -> io::Result<()> {
        self.marked(Mark::Warning, msg)
    }

    pub fn info(&self, msg: &str) -> io::Result<()> {
        self.marked(Mark::Info, msg)
    }

    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        if self.no_color {
            self.term.write_line(text)
        } else {
            self.term.write_line(&text.cyan().bold().to_string())
        }
    }

    fn marked(&self, mark: Mark, msg: &str) -> io::Result<()> {
        if self.quiet && mark != Mark::Error {
            return Ok(());
        }
        let (symbol, color) = mark.parts();
        let line = if self.no_color {
            format!("{symbol} {msg}")
        } else {
            format!(
                "{} {}",
                symbol.color(color).bold(),
                msg.color(color)
            )
        };
        self.term.write_line(&line)
    }

    /// Spinner on stderr for slow steps. Hidden unless the output is for a
    /// human at a terminal.
    pub fn spinner(&self, msg: impl Into<Cow<'static, str>>) -> ProgressBar {
        if self.quiet || self.format() != OutputFormat::Human {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(msg);
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// `true` if ANSI colours are enabled.
    pub fn supports_color(&self) -> bool {
        !self.no_color
    }

    /// `true` if quiet mode suppresses most output.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// `true` when results should be emitted as JSON.
    pub fn is_json(&self) -> bool {
        self.resolved_format == OutputFormat::Json
    }

    /// The resolved (non-Auto) output format.
    pub fn format(&self) -> OutputFormat {
        self.resolved_format
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Success,
    Error,
    Warning,
    Info,
}

impl Mark {
    fn parts(self) -> (&'static str, AnsiColors) {
        match self {
            Self::Success => ("\u{2713}", AnsiColors::Green),
            Self::Error => ("\u{2717}", AnsiColors::Red),
            Self::Warning => ("\u{26a0}", AnsiColors::Yellow),
            Self::Info => ("\u{2139}", AnsiColors::Blue),
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
