use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::gate::TickGate;
use super::settings::{Annotation, SessionSettings};
use super::status::{StatusIndicator, StatusMessage};
use super::worker::Worker;
use super::SessionError;
use crate::archive::{ArchiveContainer, MasterBundleBuilder, RollingArchiver};
use crate::capture::{CaptureArtifact, CaptureError, CaptureUnit, ScreenSource};
use crate::session::{Durations, EventKind, SessionState, SessionTimeline, Summarizer};
use crate::util::names::batch_label;
use crate::util::paths::{archives_dir_in, temp_dir_in};

/// Where a scheduler keeps its ephemeral files
#[derive(Debug, Clone)]
pub struct SchedulerPaths {
    pub temp_dir: PathBuf,
    pub archives_dir: PathBuf,
}

impl SchedulerPaths {
    pub fn in_data_dir(root: &Path) -> Self {
        Self {
            temp_dir: temp_dir_in(root),
            archives_dir: archives_dir_in(root),
        }
    }
}

/// Result of a finished session
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub session_id: Uuid,
    pub master_bundle: Option<PathBuf>,
    pub error: Option<String>,
    pub durations: Durations,
}

/// Batch plus archive list; only touched under `Shared::data`
#[derive(Debug)]
pub(crate) struct SessionData {
    pub batch: Vec<CaptureArtifact>,
    pub batch_started: DateTime<Local>,
    pub archiver: RollingArchiver,
    /// Archive error from the stop transition, reported when the session ends
    pub stop_error: Option<String>,
}

/// State reachable from both the control surface and the worker
pub(crate) struct Shared {
    pub state: watch::Sender<SessionState>,
    pub status: StatusIndicator,
    pub gate: TickGate,
    pub data: tokio::sync::Mutex<SessionData>,
    pub timeline: Mutex<SessionTimeline>,
    pub outcome: Mutex<Option<SessionOutcome>>,
    pub master: MasterBundleBuilder,
}

impl Shared {
    pub fn new(archives_dir: PathBuf, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            state: watch::channel(SessionState::Stopped).0,
            status: StatusIndicator::new("Ready to start capture."),
            gate: TickGate::new(),
            data: tokio::sync::Mutex::new(SessionData {
                batch: Vec::new(),
                batch_started: Local::now(),
                archiver: RollingArchiver::new(archives_dir),
                stop_error: None,
            }),
            timeline: Mutex::new(SessionTimeline::new()),
            outcome: Mutex::new(None),
            master: MasterBundleBuilder::new(summarizer),
        }
    }

    /// Archive the current batch, ending its window at `end`.
    ///
    /// The batch is cleared only on success; on failure its files stay on
    /// disk and in the batch for the next attempt.
    pub fn roll_batch(
        &self,
        data: &mut SessionData,
        end: DateTime<Local>,
    ) -> Result<Option<ArchiveContainer>, SessionError> {
        if data.batch.is_empty() {
            return Ok(None);
        }
        let label = batch_label(self.timeline.lock().last_active_comment());
        let start = data.batch_started;
        match data.archiver.archive(&data.batch, start, end, &label) {
            Ok(container) => {
                data.batch.clear();
                if let Some(c) = &container {
                    self.status.info(format!("Archived to {}", c.file_name()));
                }
                Ok(container)
            }
            Err(e) => {
                let err = SessionError::ArchiveWrite(e);
                self.status
                    .error(format!("{err} ({} captures kept)", data.batch.len()));
                Err(err)
            }
        }
    }

    fn record(&self, kind: EventKind, comment: String) {
        if let Err(e) = self.timeline.lock().record(kind, comment) {
            tracing::error!(error = %e, "Timeline rejected event");
        }
    }
}

struct ActiveRun {
    session_id: Uuid,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Drives capture sessions: start / pause / resume / stop.
///
/// Transitions take `&mut self`, so the control surface serializes them.
/// Invalid transitions (pause while paused, stop while stopped, ...) are
/// no-ops that return the current state.
pub struct CaptureScheduler {
    shared: Arc<Shared>,
    screen: Arc<dyn ScreenSource>,
    paths: SchedulerPaths,
    run: Option<ActiveRun>,
}

impl CaptureScheduler {
    pub fn new(
        paths: SchedulerPaths,
        screen: Arc<dyn ScreenSource>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        let shared = Arc::new(Shared::new(paths.archives_dir.clone(), summarizer));
        Self {
            shared,
            screen,
            paths,
            run: None,
        }
    }

    pub fn state(&self) -> SessionState {
        *self.shared.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.shared.state.subscribe()
    }

    pub fn status(&self) -> StatusMessage {
        self.shared.status.current()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<StatusMessage> {
        self.shared.status.subscribe()
    }

    /// Snapshot of the current session's timeline
    pub fn timeline(&self) -> SessionTimeline {
        self.shared.timeline.lock().clone()
    }

    /// Outcome of the most recently finished session
    pub fn last_outcome(&self) -> Option<SessionOutcome> {
        self.shared.outcome.lock().clone()
    }

    /// Number of captures waiting in the current batch
    pub async fn pending_captures(&self) -> usize {
        self.shared.data.lock().await.batch.len()
    }

    /// Batch archives written so far this session
    pub async fn session_archives(&self) -> Vec<ArchiveContainer> {
        self.shared.data.lock().await.archiver.archives().to_vec()
    }

    /// A stop has been requested and the worker has not finished yet
    pub fn is_stopping(&self) -> bool {
        self.run
            .as_ref()
            .is_some_and(|r| r.token.is_cancelled() && !r.handle.is_finished())
    }

    /// Whether the worker task is still alive
    pub fn worker_alive(&self) -> bool {
        self.run.as_ref().is_some_and(|r| !r.handle.is_finished())
    }

    fn stop_requested(&self) -> bool {
        self.run.as_ref().is_some_and(|r| r.token.is_cancelled())
    }

    /// Drop the handle of a worker that already exited
    fn reap(&mut self) {
        if self.run.as_ref().is_some_and(|r| r.handle.is_finished()) {
            self.run = None;
        }
    }

    /// Begin a session. Valid only from Stopped.
    pub async fn start(
        &mut self,
        settings: SessionSettings,
        note: Annotation,
    ) -> Result<SessionState, SessionError> {
        self.reap();
        let state = self.state();
        if state == SessionState::Stopped && self.run.is_some() {
            // The previous worker has published Stopped and is about to exit.
            self.wait_stopped().await;
        }
        if state != SessionState::Stopped {
            tracing::debug!(?state, "start ignored");
            return Ok(state);
        }

        let Some(destination) = settings.destination.clone() else {
            let err = SessionError::ConfigurationMissing;
            self.shared.status.error(err.to_string());
            return Err(err);
        };
        let Annotation::Comment(comment) = note else {
            return Err(SessionError::UserCancelled);
        };

        let session_id = Uuid::new_v4();
        {
            let mut data = self.shared.data.lock().await;
            let mut timeline = SessionTimeline::new();
            if let Err(e) = timeline.record(EventKind::Start, comment) {
                tracing::error!(error = %e, "Timeline rejected event");
            }
            data.batch_started = timeline.started_at().unwrap_or_else(Local::now);
            data.batch.clear();
            data.stop_error = None;
            data.archiver = RollingArchiver::new(self.paths.archives_dir.clone());
            *self.shared.timeline.lock() = timeline;
        }
        *self.shared.outcome.lock() = None;

        let token = CancellationToken::new();
        let unit = CaptureUnit::new(
            self.screen.clone(),
            self.paths.temp_dir.clone(),
            settings.quality,
        );
        let worker = Worker::new(
            self.shared.clone(),
            session_id,
            settings,
            destination,
            unit,
            token.clone(),
        );

        self.shared.gate.open();
        self.shared.state.send_replace(SessionState::Running);
        self.shared.status.info("Starting capture...");
        tracing::info!(%session_id, "Session started");
        self.check_screen().await;

        let handle = tokio::spawn(worker.run());
        self.run = Some(ActiveRun {
            session_id,
            token,
            handle,
        });
        Ok(SessionState::Running)
    }

    /// Put an unusable display backend on the status line before the first tick
    async fn check_screen(&self) {
        let screen = self.screen.clone();
        if let Ok(Err(e @ CaptureError::Unsupported(_))) =
            tokio::task::spawn_blocking(move || screen.monitors()).await
        {
            self.shared.status.error(SessionError::Capture(e).to_string());
        }
    }

    /// Archive the batch and park the worker. Valid only from Running.
    pub async fn pause(&mut self, note: Annotation) -> Result<SessionState, SessionError> {
        let state = self.state();
        if state != SessionState::Running || self.stop_requested() {
            return Ok(state);
        }
        let Annotation::Comment(comment) = note else {
            return Err(SessionError::UserCancelled);
        };

        self.shared.status.info("Archiving before pause...");
        // Close first: no tick may begin once a pause is requested.
        self.shared.gate.close();
        let archived = {
            let mut data = self.shared.data.lock().await;
            let rolled = self.shared.roll_batch(&mut data, Local::now());
            self.shared.record(EventKind::Pause, comment);
            rolled.is_ok()
        };
        self.shared.state.send_replace(SessionState::Paused);
        // A failed archive keeps its error on the status line.
        if archived {
            self.shared.status.info("Capture paused.");
        }
        Ok(SessionState::Paused)
    }

    /// Reopen the gate. Valid only from Paused.
    pub async fn resume(&mut self, note: Annotation) -> Result<SessionState, SessionError> {
        let state = self.state();
        if state != SessionState::Paused || self.stop_requested() {
            return Ok(state);
        }
        let Annotation::Comment(comment) = note else {
            return Err(SessionError::UserCancelled);
        };

        {
            let mut data = self.shared.data.lock().await;
            self.shared.record(EventKind::Resume, comment);
            // A batch kept after a failed archive keeps its original window.
            if data.batch.is_empty() {
                data.batch_started = self
                    .shared
                    .timeline
                    .lock()
                    .last_at()
                    .unwrap_or_else(Local::now);
            }
            self.shared.gate.open();
        }
        self.shared.state.send_replace(SessionState::Running);
        self.shared.status.info("Capture resumed.");
        Ok(SessionState::Running)
    }

    /// Archive the batch, close the timeline and signal the worker to finish.
    ///
    /// The state reaches Stopped once the worker has built the master bundle;
    /// use [`wait_stopped`](Self::wait_stopped) to wait for that.
    pub async fn stop(&mut self, note: Annotation) -> Result<SessionState, SessionError> {
        let state = self.state();
        let Some(token) = self.run.as_ref().map(|r| r.token.clone()) else {
            return Ok(state);
        };
        if !state.is_active() || token.is_cancelled() {
            return Ok(state);
        }
        let Annotation::Comment(comment) = note else {
            return Err(SessionError::UserCancelled);
        };

        self.shared
            .status
            .info("Stopping... please wait for final archive.");
        {
            let mut data = self.shared.data.lock().await;
            // Cancel under the lock: a worker waiting for it sees the signal
            // and captures nothing more.
            token.cancel();
            if let Err(e) = self.shared.roll_batch(&mut data, Local::now()) {
                data.stop_error = Some(e.to_string());
            }
            self.shared.record(EventKind::Stop, comment);
        }
        // Let a paused worker observe the stop and exit.
        self.shared.gate.open();
        Ok(self.state())
    }

    /// Wait for the worker to exit and return the resulting state
    pub async fn wait_stopped(&mut self) -> SessionState {
        if let Some(run) = self.run.take() {
            if let Err(e) = run.handle.await {
                tracing::error!(session_id = %run.session_id, error = %e, "Capture worker failed");
                self.shared.gate.close();
                self.shared.state.send_replace(SessionState::Stopped);
                self.shared
                    .status
                    .error(format!("Capture worker failed: {e}"));
            }
        }
        self.state()
    }

    /// Full stop sequence for application exit: stop, then wait for the worker
    pub async fn shutdown(&mut self, note: Annotation) -> Result<SessionState, SessionError> {
        self.stop(note).await?;
        Ok(self.wait_stopped().await)
    }
}
