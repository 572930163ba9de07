//! Scheduler fixtures rooted in a temporary directory

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use screenlog::scheduler::StatusMessage;
use screenlog::session::NoSummarizer;
use screenlog::{CaptureScheduler, Quality, SchedulerPaths, SessionMetadata, SessionSettings};
use tempfile::TempDir;

use super::screen::ScriptedScreen;

/// Interval short enough that a few ticks fit in a test
pub const FAST_INTERVAL: Duration = Duration::from_millis(20);

/// Upper bound for anything a test waits on
pub const WAIT: Duration = Duration::from_secs(10);

/// Data root plus master destination, cleaned up on drop
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::create_dir_all(dir.path().join("masters")).expect("Failed to create dest dir");
        Self { dir }
    }

    pub fn data_root(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn paths(&self) -> SchedulerPaths {
        SchedulerPaths::in_data_dir(&self.data_root())
    }

    pub fn destination(&self) -> PathBuf {
        self.dir.path().join("masters")
    }

    pub fn scheduler(&self, screen: Arc<ScriptedScreen>) -> CaptureScheduler {
        CaptureScheduler::new(self.paths(), screen, Arc::new(NoSummarizer))
    }

    pub fn settings(&self, interval: Duration) -> SessionSettings {
        SessionSettings::new(1, Quality::Low)
            .with_interval(interval)
            .with_destination(self.destination())
            .with_metadata(SessionMetadata {
                name: "Sam".to_string(),
                company: "Acme".to_string(),
                description: "Printer setup".to_string(),
                ..Default::default()
            })
    }
}

/// Files directly inside `dir`, sorted; empty when the directory is missing
pub fn list_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_file())
                .collect()
        })
        .unwrap_or_default();
    files.sort();
    files
}

/// Wait until the batch holds at least `n` captures
pub async fn wait_for_captures(scheduler: &CaptureScheduler, n: usize) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if scheduler.pending_captures().await >= n {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}

/// Wait until the status indicator satisfies `check`
pub async fn wait_for_status(
    scheduler: &CaptureScheduler,
    check: impl Fn(&StatusMessage) -> bool,
) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if check(&scheduler.status()) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    false
}

/// Wait until the scripted screen has been asked for at least `n` grabs
pub async fn wait_for_attempts(screen: &ScriptedScreen, n: usize) -> bool {
    let deadline = Instant::now() + WAIT;
    while Instant::now() < deadline {
        if screen.attempts() >= n {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}
