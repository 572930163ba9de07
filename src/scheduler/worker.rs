//! Background tick loop for one capture session

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::control::{SessionData, SessionOutcome, Shared};
use super::gate::TickGate;
use super::settings::SessionSettings;
use super::timing::sleep_duration;
use super::SessionError;
use crate::capture::{CaptureError, CaptureUnit};
use crate::session::{format_active_time, SessionState};

pub(crate) struct Worker {
    shared: Arc<Shared>,
    session_id: Uuid,
    settings: SessionSettings,
    destination: PathBuf,
    unit: CaptureUnit,
    token: CancellationToken,
    /// The backend reported it cannot capture; `start` already said so
    unsupported_logged: bool,
}

impl Worker {
    pub fn new(
        shared: Arc<Shared>,
        session_id: Uuid,
        settings: SessionSettings,
        destination: PathBuf,
        unit: CaptureUnit,
        token: CancellationToken,
    ) -> Self {
        Self {
            shared,
            session_id,
            settings,
            destination,
            unit,
            token,
            unsupported_logged: false,
        }
    }

    pub async fn run(mut self) {
        let mut gate = self.shared.gate.subscribe();
        tracing::debug!(
            session_id = %self.session_id,
            interval_ms = self.settings.interval.as_millis() as u64,
            "Capture worker started"
        );

        loop {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                open = TickGate::wait_open(&mut gate) => {
                    if !open {
                        break;
                    }
                }
            }
            if self.token.is_cancelled() {
                break;
            }

            let started = Instant::now();
            self.tick().await;

            let wait = sleep_duration(self.settings.interval, started.elapsed());
            tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }
        }

        self.finish().await;
    }

    /// One capture plus an optional rolling archive, all under the data lock
    async fn tick(&mut self) {
        let mut data = self.shared.data.lock().await;
        // A pause or stop may have completed while we waited for the lock.
        if self.token.is_cancelled() || !self.shared.gate.is_open() {
            return;
        }

        let unit = self.unit.clone();
        match tokio::task::spawn_blocking(move || unit.capture()).await {
            Ok(Ok(artifact)) => {
                self.shared.status.info(format!(
                    "Last capture: {}",
                    artifact.captured_at.format("%H:%M:%S")
                ));
                data.batch.push(artifact);
            }
            Ok(Err(CaptureError::Unsupported(reason))) => {
                if !self.unsupported_logged {
                    tracing::warn!(%reason, "Screen capture unsupported");
                    self.unsupported_logged = true;
                }
            }
            Ok(Err(e)) => {
                self.shared
                    .status
                    .warn(SessionError::Capture(e).to_string());
            }
            Err(e) => {
                self.shared.status.warn(format!("Capture task failed: {e}"));
            }
        }

        self.maybe_roll(&mut data);
    }

    fn maybe_roll(&self, data: &mut SessionData) {
        let Some(every) = self.settings.archive_every else {
            return;
        };
        let now = Local::now();
        let age = (now - data.batch_started).to_std().unwrap_or_default();
        if age < every {
            return;
        }
        // Nothing captured this window: start the next one here.
        if data.batch.is_empty() {
            data.batch_started = now;
            return;
        }
        if self.shared.roll_batch(data, now).is_ok() {
            data.batch_started = now;
        }
    }

    /// Build the master bundle and publish the outcome, then report Stopped
    async fn finish(self) {
        let (archives, timeline, stop_error, kept) = {
            let mut data = self.shared.data.lock().await;
            let timeline = self.shared.timeline.lock().clone();
            (
                data.archiver.take_archives(),
                timeline,
                data.stop_error.take(),
                data.batch.len(),
            )
        };
        let durations = timeline.summarize();

        self.shared.status.info("Creating master archive...");
        let result = self
            .shared
            .master
            .build(
                &timeline,
                &self.settings.metadata,
                &archives,
                &self.destination,
            )
            .await;

        let outcome = match result {
            Ok(path) => {
                match &stop_error {
                    Some(_) => self.shared.status.warn(format!(
                        "Session complete; {kept} captures could not be archived and remain in {}",
                        self.unit.output_dir().display()
                    )),
                    None => self.shared.status.info(format!(
                        "Session complete. Active time: {}",
                        format_active_time(durations.active)
                    )),
                }
                SessionOutcome {
                    session_id: self.session_id,
                    master_bundle: Some(path),
                    error: stop_error,
                    durations,
                }
            }
            Err(e) => {
                let err = SessionError::BundleWrite(e);
                let mut data = self.shared.data.lock().await;
                self.shared.status.error(format!(
                    "{err}. Batch archives kept in {}",
                    data.archiver.output_dir().display()
                ));
                data.archiver.restore_archives(archives);
                drop(data);
                SessionOutcome {
                    session_id: self.session_id,
                    master_bundle: None,
                    error: Some(match stop_error {
                        Some(stop_err) => format!("{err}; {stop_err}"),
                        None => err.to_string(),
                    }),
                    durations,
                }
            }
        };

        tracing::info!(
            session_id = %self.session_id,
            active_secs = durations.active.num_seconds(),
            total_secs = durations.total.num_seconds(),
            "Capture worker finished"
        );
        *self.shared.outcome.lock() = Some(outcome);
        self.shared.gate.close();
        self.shared.state.send_replace(SessionState::Stopped);
    }
}
