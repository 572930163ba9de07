use std::path::PathBuf;
use std::time::Duration;

use crate::capture::Quality;
use crate::session::SessionMetadata;

/// Default seconds between captures
pub const DEFAULT_INTERVAL_SECS: u64 = 5;

/// Per-session settings handed to [`CaptureScheduler::start`](super::CaptureScheduler::start)
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Time between capture ticks
    pub interval: Duration,
    pub quality: Quality,
    /// Roll the batch into an archive once its window reaches this length
    pub archive_every: Option<Duration>,
    /// Directory for the master bundle; required to start
    pub destination: Option<PathBuf>,
    /// Report header; `description` also names the master bundle
    pub metadata: SessionMetadata,
}

impl SessionSettings {
    pub fn new(interval_secs: u64, quality: Quality) -> Self {
        Self {
            interval: Duration::from_secs(interval_secs),
            quality,
            archive_every: None,
            destination: None,
            metadata: SessionMetadata::default(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_destination(mut self, dir: impl Into<PathBuf>) -> Self {
        self.destination = Some(dir.into());
        self
    }

    pub fn with_archive_every(mut self, every: Duration) -> Self {
        self.archive_every = Some(every);
        self
    }

    pub fn with_metadata(mut self, metadata: SessionMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL_SECS, Quality::default())
    }
}

/// Comment resolved by the caller for a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    Comment(String),
    /// The prompt was dismissed; the transition must not happen
    Cancelled,
}

impl Annotation {
    pub fn comment(text: impl Into<String>) -> Self {
        Annotation::Comment(text.into())
    }
}

impl From<Option<String>> for Annotation {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(text) => Annotation::Comment(text),
            None => Annotation::Cancelled,
        }
    }
}
