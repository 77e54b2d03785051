//! Source-control revision lookup and the system clock.

use std::path::PathBuf;
use std::process::Command;

use chrono::{Local, NaiveDateTime};
use tracing::debug;

use podgen_core::application::ports::{Clock, RevisionSource};

/// Asks `git` for the short hash of `HEAD`.
#[derive(Debug, Clone)]
pub struct GitRevision {
    dir: PathBuf,
}

impl GitRevision {
    /// Look up the revision of the repository containing `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl RevisionSource for GitRevision {
    fn short_revision(&self) -> Option<String> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.dir)
            .args(["rev-parse", "--short", "HEAD"])
            .output();

        match output {
            Ok(out) if out.status.success() => {
                let hash = String::from_utf8_lossy(&out.stdout).trim().to_owned();
                (!hash.is_empty()).then_some(hash)
            }
            Ok(out) => {
                debug!(
                    stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                    "No git revision"
                );
                None
            }
            Err(e) => {
                debug!(error = %e, "git not available");
                None
            }
        }
    }
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outside_a_repository_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(GitRevision::new(dir.path()).short_revision(), None);
    }

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        assert!(clock.now() >= first);
    }
}
