//! Scratch directory for uploads in flight.
//!
//! Every stored upload is owned by a [`ScratchFile`] guard that deletes it
//! on drop, so the file goes away however the request ends: normal return,
//! error, or the handler future being dropped on client disconnect.

use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    /// Create the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create scratch dir {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, storage_name: &str) -> PathBuf {
        self.root.join(storage_name)
    }

    /// Store `bytes` under `storage_name`.
    ///
    /// The guard exists before the write starts, so a partially written
    /// file is removed when the write fails.
    pub async fn write(&self, storage_name: &str, bytes: &[u8]) -> std::io::Result<ScratchFile> {
        let file = ScratchFile {
            path: self.path_for(storage_name),
        };
        tokio::fs::write(&file.path, bytes).await?;
        debug!("Stored upload at {}", file.path.display());
        Ok(file)
    }
}

/// An upload on disk, deleted when dropped
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed scratch file {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove scratch file {}: {}", self.path.display(), e),
        }
    }
}
