//! Final per-session bundle: the report plus every batch archive

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::container::{write_container, ArchiveContainer, ContainerEntry, CONTAINER_EXTENSION};
use super::ArchiveError;
use crate::session::{render_report, with_summary, SessionMetadata, SessionTimeline, Summarizer};
use crate::util::names::master_bundle_stem;
use crate::util::paths::unique_path;

/// Entry name of the report inside the master bundle
pub const REPORT_ENTRY_NAME: &str = "readme.txt";

pub struct MasterBundleBuilder {
    summarizer: Arc<dyn Summarizer>,
}

impl MasterBundleBuilder {
    pub fn new(summarizer: Arc<dyn Summarizer>) -> Self {
        Self { summarizer }
    }

    /// Report text, with a synopsis prepended when one is available
    pub async fn report(&self, meta: &SessionMetadata, timeline: &SessionTimeline) -> String {
        let body = render_report(meta, timeline);
        match self.summarizer.summarize(&body).await {
            Some(summary) => with_summary(&summary, &body),
            None => body,
        }
    }

    /// Write the master bundle into `destination_dir`.
    ///
    /// Batch archives are deleted only after the bundle is safely on disk;
    /// on failure they are all left in place.
    pub async fn build(
        &self,
        timeline: &SessionTimeline,
        meta: &SessionMetadata,
        batch_archives: &[ArchiveContainer],
        destination_dir: &Path,
    ) -> Result<PathBuf, ArchiveError> {
        let report = self.report(meta, timeline).await;

        let destination_dir = destination_dir.to_path_buf();
        let stem = match (timeline.started_at(), timeline.last_at()) {
            (Some(start), Some(end)) => master_bundle_stem(start, end, &meta.description),
            _ => {
                let now = chrono::Local::now();
                master_bundle_stem(now, now, &meta.description)
            }
        };
        let archives = batch_archives.to_vec();

        tokio::task::spawn_blocking(move || {
            write_master(&destination_dir, &stem, report, &archives)
        })
        .await
        .map_err(|e| ArchiveError::Io(std::io::Error::other(e)))?
    }
}

fn write_master(
    destination_dir: &Path,
    stem: &str,
    report: String,
    archives: &[ArchiveContainer],
) -> Result<PathBuf, ArchiveError> {
    let path = unique_path(destination_dir, stem, CONTAINER_EXTENSION);

    let mut entries = vec![ContainerEntry::Bytes {
        name: REPORT_ENTRY_NAME.to_string(),
        data: report.into_bytes(),
    }];
    let mut included = Vec::new();
    for archive in archives {
        if archive.path.exists() {
            entries.push(ContainerEntry::File(archive.path.clone()));
            included.push(&archive.path);
        } else {
            tracing::warn!(
                path = %archive.path.display(),
                "Batch archive missing, skipping"
            );
        }
    }

    write_container(&path, &entries)?;

    for archive_path in included {
        if let Err(e) = fs::remove_file(archive_path) {
            tracing::warn!(
                path = %archive_path.display(),
                error = %e,
                "Failed to remove bundled batch archive"
            );
        }
    }

    tracing::info!(path = %path.display(), "Master bundle created");
    Ok(path)
}
