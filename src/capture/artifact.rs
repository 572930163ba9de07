use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

/// A stored still image waiting to be rolled into a batch archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureArtifact {
    pub path: PathBuf,
    pub captured_at: DateTime<Local>,
}

impl CaptureArtifact {
    pub fn new(path: PathBuf, captured_at: DateTime<Local>) -> Self {
        Self { path, captured_at }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base file name, used as the entry name inside archives
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
