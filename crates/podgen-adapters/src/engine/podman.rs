//! `podman` (or any CLI-compatible engine) driven as a child process.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use tracing::{debug, instrument};

use podgen_core::{
    application::{ApplicationError, PushError, ports::ContainerEngine},
    error::PodgenResult,
};

#[derive(Debug, Clone)]
pub struct PodmanEngine {
    binary: String,
}

impl PodmanEngine {
    /// `binary` is looked up on `PATH`; `docker` works too.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Fail early when the engine cannot be started at all.
    pub fn ensure_available(&self) -> PodgenResult<()> {
        let unavailable = |reason: String| ApplicationError::EngineUnavailable {
            engine: self.binary.clone(),
            reason,
        };

        let output = Command::new(&self.binary)
            .arg("--version")
            .output()
            .map_err(|e| unavailable(e.to_string()))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(unavailable(stderr_of(&output)).into())
        }
    }

    fn run(&self, args: &[&str]) -> Result<Output, PushError> {
        debug!(binary = %self.binary, ?args, "Running engine");
        Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|e| PushError::Engine {
                reason: format!("failed to run {}: {e}", self.binary),
            })
    }

    fn run_checked(&self, args: &[&str], registry: &str) -> Result<(), PushError> {
        let output = self.run(args)?;
        if output.status.success() {
            Ok(())
        } else {
            Err(classify(registry, &stderr_of(&output)))
        }
    }
}

impl ContainerEngine for PodmanEngine {
    fn image_exists(&self, image: &str) -> Result<bool, PushError> {
        let output = self.run(&["image", "exists", image])?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(PushError::Engine {
                reason: stderr_of(&output),
            }),
        }
    }

    #[instrument(skip(self, token))]
    fn login(&self, registry: &str, username: &str, token: &str) -> Result<(), PushError> {
        let mut child = Command::new(&self.binary)
            .args(["login", "--username", username, "--password-stdin", registry])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| PushError::Engine {
                reason: format!("failed to run {}: {e}", self.binary),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(token.as_bytes())
                .map_err(|e| PushError::Engine {
                    reason: format!("failed to pass credentials: {e}"),
                })?;
        }

        let output = child.wait_with_output().map_err(|e| PushError::Engine {
            reason: e.to_string(),
        })?;

        if output.status.success() {
            Ok(())
        } else {
            // A rejected login is an authentication failure whatever the message.
            match classify(registry, &stderr_of(&output)) {
                err @ PushError::Network { .. } => Err(err),
                other => Err(PushError::Authentication {
                    registry: registry.to_owned(),
                    reason: other.to_string(),
                }),
            }
        }
    }

    fn tag(&self, source: &str, target: &str) -> Result<(), PushError> {
        self.run_checked(&["tag", source, target], registry_of(target))
    }

    #[instrument(skip(self))]
    fn push(&self, reference: &str) -> Result<(), PushError> {
        self.run_checked(&["push", reference], registry_of(reference))
    }
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_owned()
}

fn registry_of(reference: &str) -> &str {
    reference.split('/').next().unwrap_or(reference)
}

/// Map engine stderr onto a push failure kind.
fn classify(registry: &str, stderr: &str) -> PushError {
    let lower = stderr.to_ascii_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if has(&["unauthorized", "authentication required", "denied", "invalid username"]) {
        PushError::Authentication {
            registry: registry.to_owned(),
            reason: stderr.to_owned(),
        }
    } else if has(&["image not known", "no such image", "does not exist"]) {
        PushError::ImageNotFound {
            image: stderr.to_owned(),
        }
    } else if has(&[
        "connection refused",
        "connection reset",
        "no such host",
        "timeout",
        "timed out",
        "network is unreachable",
    ]) {
        PushError::Network {
            reason: stderr.to_owned(),
        }
    } else {
        PushError::Engine {
            reason: stderr.to_owned(),
        }
    }
}
