//! Rolls a batch of captures into one compressed container

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use super::container::{write_container, ArchiveContainer, ContainerEntry, CONTAINER_EXTENSION};
use super::ArchiveError;
use crate::capture::CaptureArtifact;
use crate::util::names::batch_archive_stem;
use crate::util::paths::unique_path;

/// Writes per-batch containers and remembers every one it produced
#[derive(Debug)]
pub struct RollingArchiver {
    output_dir: PathBuf,
    archives: Vec<ArchiveContainer>,
}

impl RollingArchiver {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            archives: Vec::new(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Containers produced so far this session
    pub fn archives(&self) -> &[ArchiveContainer] {
        &self.archives
    }

    /// Hand the session's containers to the master bundle step
    pub fn take_archives(&mut self) -> Vec<ArchiveContainer> {
        std::mem::take(&mut self.archives)
    }

    /// Put containers back after a failed master bundle so they can be retried
    pub fn restore_archives(&mut self, archives: Vec<ArchiveContainer>) {
        let mut restored = archives;
        restored.append(&mut self.archives);
        self.archives = restored;
    }

    /// Archive `batch` and delete its source files.
    ///
    /// Returns `Ok(None)` for an empty batch. On error the source files are
    /// untouched and nothing is recorded.
    pub fn archive(
        &mut self,
        batch: &[CaptureArtifact],
        start: DateTime<Local>,
        end: DateTime<Local>,
        label: &str,
    ) -> Result<Option<ArchiveContainer>, ArchiveError> {
        if batch.is_empty() {
            return Ok(None);
        }

        fs::create_dir_all(&self.output_dir)?;
        let stem = batch_archive_stem(start, end, label);
        let path = unique_path(&self.output_dir, &stem, CONTAINER_EXTENSION);

        let entries: Vec<ContainerEntry> = batch
            .iter()
            .map(|a| ContainerEntry::File(a.path.clone()))
            .collect();
        write_container(&path, &entries)?;

        for artifact in batch {
            if let Err(e) = fs::remove_file(&artifact.path) {
                tracing::warn!(
                    path = %artifact.path.display(),
                    error = %e,
                    "Failed to remove archived capture"
                );
            }
        }

        let container = ArchiveContainer {
            path,
            entries: batch.len(),
        };
        tracing::info!(
            path = %container.path.display(),
            entries = container.entries,
            "Batch archived"
        );
        self.archives.push(container.clone());
        Ok(Some(container))
    }
}
