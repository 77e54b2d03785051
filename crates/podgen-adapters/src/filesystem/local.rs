//! Local filesystem adapter using std::fs.

use std::io;
use std::path::{Path, PathBuf};

use podgen_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{PodgenError, PodgenResult},
};
use tracing::trace;

/// Production filesystem implementation using `std::fs`.
///
/// Files are written to a sibling temporary file and renamed into place, so
/// a failed write leaves the previous file (or nothing) behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    pub fn new() -> Self {
        Self
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> PodgenResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &str) -> PodgenResult<()> {
        let staging = staging_path(path);
        trace!(path = %path.display(), staging = %staging.display(), "Writing");

        if let Err(e) = std::fs::write(&staging, content) {
            let _ = std::fs::remove_file(&staging);
            return Err(map_io_error(path, e, "write file"));
        }
        std::fs::rename(&staging, path).map_err(|e| {
            let _ = std::fs::remove_file(&staging);
            map_io_error(path, e, "replace file")
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove_file(&self, path: &Path) -> PodgenResult<()> {
        std::fs::remove_file(path).map_err(|e| map_io_error(path, e, "remove file"))
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.podgen-tmp"))
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> PodgenError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {operation}: {e}"),
    }
    .into()
}
