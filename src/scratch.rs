//! Scratch directory for staging formatter input and output.
//!
//! Every request gets its own randomly named file, so concurrent requests
//! share the directory without coordination.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempPath;

const FILE_PREFIX: &str = "fmt-";

/// The shared directory holding per-request scratch files
#[derive(Debug, Clone)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the directory (and parents) if missing; succeeds if it already exists
    pub async fn ensure(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.path).await
    }

    /// Reserve a uniquely named file in the directory.
    ///
    /// `extension` is the source file's extension without the dot; the scratch
    /// file keeps it so formatters can detect the language from the name.
    pub fn allocate(&self, extension: Option<&str>) -> io::Result<ScratchFile> {
        let suffix = extension.map(|ext| format!(".{ext}")).unwrap_or_default();
        let file = tempfile::Builder::new()
            .prefix(FILE_PREFIX)
            .suffix(&suffix)
            .tempfile_in(&self.path)?;
        Ok(ScratchFile {
            path: file.into_temp_path(),
        })
    }
}

/// A file owned by a single formatting request.
///
/// Removed by [`ScratchFile::release`], or on drop if the request bails out early.
#[derive(Debug)]
pub struct ScratchFile {
    path: TempPath,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Best-effort delete. Never fails; problems are only logged.
    pub fn release(self) {
        let display = self.path.display().to_string();
        if let Err(e) = self.path.close() {
            log::debug!("Failed to remove scratch file {}: {}", display, e);
        }
    }
}
