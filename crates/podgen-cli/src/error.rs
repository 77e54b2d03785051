//! CLI errors: what went wrong, what to do about it, and which exit code
//! the process ends with.

use std::error::Error;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use thiserror::Error;

use podgen_core::error::PodgenError;

pub use podgen_core::error::ErrorCategory as CoreCategory;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types.
#[derive(Debug, Error)]
pub enum CliError {
    /// `init` would overwrite an existing settings file.
    #[error("Settings file already exists at {path}")]
    SettingsExists { path: PathBuf },

    // ── Config errors ──────────────────────────────────────────────────────
    /// The tool configuration could not be read or encoded.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ── Core errors ────────────────────────────────────────────────────────
    /// An error propagated from `podgen-core` or an adapter.
    #[error("{0}")]
    Core(#[from] PodgenError),

    /// At least one tag failed to push. Per-tag details were already shown.
    #[error("{failed} of {total} tag(s) failed to push")]
    PushFailed {
        failed: usize,
        total: usize,
        suggestions: Vec<String>,
    },

    // ── System errors ──────────────────────────────────────────────────────
    /// An I/O operation failed.
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::IoError {
            message: format!("failed to encode JSON output: {err}"),
            source: std::io::Error::other(err),
        }
    }
}

impl CliError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::SettingsExists { path } => vec![
                format!("'{}' already exists", path.display()),
                "Use --force to overwrite it".into(),
                "Or pick another file with --settings".into(),
            ],

            Self::ConfigError { message, .. } => vec![
                format!("Configuration issue: {}", message),
                "Show the default location with: podgen config path".into(),
                "Environment overrides use PODGEN_<SECTION>__<KEY>".into(),
            ],

            Self::Core(core_err) => core_err.suggestions(),

            Self::PushFailed { suggestions, .. } => suggestions.clone(),

            Self::IoError { message, .. } => vec![
                format!("I/O operation failed: {}", message),
                "Check file permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
        }
    }

    /// Get the error category for styling and exit codes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::SettingsExists { .. } => ErrorCategory::UserError,
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::Core(core) => match core.category() {
                CoreCategory::Validation => ErrorCategory::UserError,
                CoreCategory::Composition => ErrorCategory::UserError,
                CoreCategory::Configuration => ErrorCategory::Configuration,
                CoreCategory::NotFound => ErrorCategory::NotFound,
                CoreCategory::Push => ErrorCategory::Push,
                CoreCategory::Internal => ErrorCategory::Internal,
            },
            Self::PushFailed { .. } => ErrorCategory::Push,
            Self::IoError { .. } => ErrorCategory::Internal,
        }
    }

    /// Exit code to pass to the OS.
    pub fn exit_code(&self) -> u8 {
        self.category().exit_code()
    }

    /// Render the error, its causes when `verbose`, and the suggestions.
    ///
    /// Colour is applied only when `colored` is set; the layout is the same
    /// either way so that logs and terminals read alike.
    pub fn report(&self, verbose: bool, colored: bool) -> String {
        let paint = |text: &str, style: owo_colors::Style| {
            if colored {
                text.style(style).to_string()
            } else {
                text.to_owned()
            }
        };
        let red = owo_colors::Style::new().red().bold();
        let dim = owo_colors::Style::new().dimmed();

        let mut out = format!("\n{} {}\n", paint("\u{2717} Error:", red), self);

        if verbose {
            let mut cause = self.source();
            while let Some(err) = cause {
                out.push_str(&format!("  {} {err}\n", paint("caused by:", dim)));
                cause = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            let heading = owo_colors::Style::new().yellow().bold();
            out.push_str(&format!("\n{}\n", paint("Suggestions:", heading)));
            for line in suggestions {
                out.push_str(&format!("  - {line}\n"));
            }
        }

        if !verbose {
            out.push_str(&format!("\n{}\n", paint("Run with -v for more detail.", dim)));
        }

        out
    }

    /// Record the failure in the log at a level matching its category.
    pub fn log(&self) {
        let cause = self.source().map(ToString::to_string);
        match self.category() {
            ErrorCategory::UserError | ErrorCategory::NotFound => {
                tracing::warn!(category = ?self.category(), cause, "{}", self);
            }
            _ => tracing::error!(category = ?self.category(), cause, "{}", self),
        }
    }
}

/// How a failure is reported; each category owns one exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCategory {
    Internal = 1,
    /// Bad settings or arguments.
    UserError = 2,
    NotFound = 3,
    Configuration = 4,
    /// One or more tags could not be pushed.
    Push = 5,
}

impl ErrorCategory {
    pub fn exit_code(self) -> u8 {
        self as u8
    }
}
