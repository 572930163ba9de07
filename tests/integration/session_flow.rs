//! End-to-end capture sessions against a scripted screen
//!
//! Covers the capture → batch archive → master bundle path, failure
//! handling on both archive levels, and how quickly stop is honoured.

use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use super::common::fixtures::{
    list_files, wait_for_attempts, wait_for_captures, wait_for_status, Workspace, FAST_INTERVAL,
    WAIT,
};
use super::common::screen::ScriptedScreen;
use screenlog::archive::REPORT_ENTRY_NAME;
use screenlog::scheduler::StatusLevel;
use screenlog::session::EventKind;
use screenlog::{Annotation, SessionError, SessionState};

fn zip_names(path: &std::path::Path) -> Vec<String> {
    let zip = zip::ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
    let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
    names.sort();
    names
}

/// Three captures, pause, resume, stop: one batch archive inside one master bundle
#[tokio::test]
async fn test_full_session_produces_master_bundle() {
    let ws = Workspace::new();
    let screen = Arc::new(ScriptedScreen::with_frames(3));
    let mut scheduler = ws.scheduler(screen.clone());

    let state = scheduler
        .start(ws.settings(FAST_INTERVAL), Annotation::comment("Starting work"))
        .await
        .unwrap();
    assert_eq!(state, SessionState::Running);

    assert!(wait_for_captures(&scheduler, 3).await, "three captures expected");
    // Let the worker run past the last good frame so later failures are exercised.
    assert!(wait_for_attempts(&screen, 5).await);
    assert_eq!(scheduler.pending_captures().await, 3);

    let state = scheduler
        .pause(Annotation::comment("Pausing to take note or a break."))
        .await
        .unwrap();
    assert_eq!(state, SessionState::Paused);
    assert_eq!(scheduler.pending_captures().await, 0);
    assert!(list_files(&ws.paths().temp_dir).is_empty());

    let archives = scheduler.session_archives().await;
    assert_eq!(archives.len(), 1);
    assert_eq!(archives[0].entries, 3);
    assert!(archives[0].file_name().ends_with("_Starting_work.zip"));
    assert_eq!(zip_names(&archives[0].path).len(), 3);

    scheduler
        .resume(Annotation::comment("Continuing work. Note: back"))
        .await
        .unwrap();
    assert_eq!(scheduler.state(), SessionState::Running);

    scheduler
        .stop(Annotation::comment("Pending further action or completed task"))
        .await
        .unwrap();
    let state = tokio::time::timeout(WAIT, scheduler.wait_stopped())
        .await
        .unwrap();
    assert_eq!(state, SessionState::Stopped);

    let kinds: Vec<EventKind> = scheduler.timeline().events().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::Start,
            EventKind::Pause,
            EventKind::Resume,
            EventKind::Stop
        ]
    );

    let outcome = scheduler.last_outcome().unwrap();
    assert!(outcome.error.is_none());
    let bundle = outcome.master_bundle.unwrap();
    assert!(bundle.starts_with(ws.destination()));
    let bundle_name = bundle.file_name().unwrap().to_string_lossy().to_string();
    assert!(bundle_name.starts_with("MASTER_Printer_setup_"));
    assert!(bundle_name.ends_with(".zip"));

    let names = zip_names(&bundle);
    assert_eq!(names.len(), 2);
    assert!(names.contains(&REPORT_ENTRY_NAME.to_string()));
    assert!(names.contains(&archives[0].file_name()));

    // Batch archives are folded into the bundle and removed.
    assert!(list_files(&ws.paths().archives_dir).is_empty());

    let mut zip = zip::ZipArchive::new(std::fs::File::open(&bundle).unwrap()).unwrap();
    let mut report = String::new();
    zip.by_name(REPORT_ENTRY_NAME)
        .unwrap()
        .read_to_string(&mut report)
        .unwrap();
    assert!(report.contains("Support Name: Sam"));
    assert!(report.contains("Session Start: Starting work"));
    assert!(report.contains("Session Stop: Pending further action or completed task"));

    let durations = outcome.durations;
    assert!(durations.active + durations.paused <= durations.total);
}

/// Three ticks then stop: one batch of three inside the bundle, no temp files left
#[tokio::test]
async fn test_stop_rolls_final_batch_into_bundle() {
    let ws = Workspace::new();
    let screen = Arc::new(ScriptedScreen::with_frames(3));
    let mut scheduler = ws.scheduler(screen.clone());
    scheduler
        .start(ws.settings(FAST_INTERVAL), Annotation::comment("Starting work"))
        .await
        .unwrap();
    assert!(wait_for_captures(&scheduler, 3).await);

    let state = scheduler
        .shutdown(Annotation::comment("done"))
        .await
        .unwrap();
    assert_eq!(state, SessionState::Stopped);
    assert!(list_files(&ws.paths().temp_dir).is_empty());
    assert_eq!(scheduler.status().level, StatusLevel::Info);

    let outcome = scheduler.last_outcome().unwrap();
    assert!(outcome.error.is_none());
    let bundle = outcome.master_bundle.unwrap();
    let names = zip_names(&bundle);
    assert_eq!(names.len(), 2);

    let batch_name = names
        .iter()
        .find(|n| n.as_str() != REPORT_ENTRY_NAME)
        .unwrap()
        .clone();
    let mut zip = zip::ZipArchive::new(std::fs::File::open(&bundle).unwrap()).unwrap();
    let mut inner = Vec::new();
    zip.by_name(&batch_name)
        .unwrap()
        .read_to_end(&mut inner)
        .unwrap();
    let batch = zip::ZipArchive::new(std::io::Cursor::new(inner)).unwrap();
    assert_eq!(batch.len(), 3);
}

/// A final archive that cannot be written is reported when the session ends
#[tokio::test]
async fn test_stop_archive_failure_is_reported() {
    let ws = Workspace::new();
    let paths = ws.paths();
    std::fs::create_dir_all(ws.data_root()).unwrap();
    std::fs::write(&paths.archives_dir, b"not a directory").unwrap();

    let mut scheduler = ws.scheduler(Arc::new(ScriptedScreen::with_frames(3)));
    scheduler
        .start(ws.settings(FAST_INTERVAL), Annotation::comment("Starting work"))
        .await
        .unwrap();
    assert!(wait_for_captures(&scheduler, 3).await);

    scheduler
        .shutdown(Annotation::comment("done"))
        .await
        .unwrap();
    assert_eq!(scheduler.state(), SessionState::Stopped);

    let status = scheduler.status();
    assert_ne!(status.level, StatusLevel::Info);
    assert!(status.text.contains("3 captures could not be archived"), "{status:?}");

    let outcome = scheduler.last_outcome().unwrap();
    assert!(outcome.error.unwrap().starts_with("Archive error"));
    assert!(outcome.master_bundle.is_some());
    assert_eq!(list_files(&paths.temp_dir).len(), 3);
}

#[tokio::test]
async fn test_start_without_destination_reports_and_stays_stopped() {
    let ws = Workspace::new();
    let mut scheduler = ws.scheduler(Arc::new(ScriptedScreen::unlimited()));
    let mut settings = ws.settings(FAST_INTERVAL);
    settings.destination = None;

    let err = scheduler
        .start(settings, Annotation::comment("Starting work"))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::ConfigurationMissing));
    assert_eq!(scheduler.state(), SessionState::Stopped);
    assert_eq!(scheduler.status().level, StatusLevel::Error);
    assert_eq!(
        scheduler.status().text,
        "Please select a save location for the master archive before starting"
    );
    assert!(list_files(&ws.paths().temp_dir).is_empty());
}

/// A broken archive directory keeps every capture and keeps the session running
#[tokio::test]
async fn test_archive_failure_keeps_captures_and_session() {
    let ws = Workspace::new();
    let paths = ws.paths();
    std::fs::create_dir_all(ws.data_root()).unwrap();
    std::fs::write(&paths.archives_dir, b"not a directory").unwrap();

    let mut scheduler = ws.scheduler(Arc::new(ScriptedScreen::unlimited()));
    let settings = ws
        .settings(FAST_INTERVAL)
        .with_archive_every(Duration::from_millis(1));
    scheduler
        .start(settings, Annotation::comment("Starting work"))
        .await
        .unwrap();

    assert!(
        wait_for_status(&scheduler, |s| s.level == StatusLevel::Error
            && s.text.starts_with("Archive error"))
        .await
    );
    assert!(wait_for_captures(&scheduler, 2).await);
    assert_eq!(scheduler.state(), SessionState::Running);
    assert!(scheduler.session_archives().await.is_empty());

    // Pause fails to archive too, but still pauses and keeps the batch.
    scheduler
        .pause(Annotation::comment("break"))
        .await
        .unwrap();
    assert_eq!(scheduler.state(), SessionState::Paused);
    assert_eq!(scheduler.status().level, StatusLevel::Error);
    let kept = scheduler.pending_captures().await;
    assert!(kept >= 2);
    assert_eq!(list_files(&paths.temp_dir).len(), kept);

    scheduler
        .shutdown(Annotation::comment("done"))
        .await
        .unwrap();

    // The bundle still carries the report; the captures stay on disk.
    let outcome = scheduler.last_outcome().unwrap();
    let bundle = outcome.master_bundle.unwrap();
    assert_eq!(zip_names(&bundle), vec![REPORT_ENTRY_NAME.to_string()]);
    assert_eq!(list_files(&paths.temp_dir).len(), kept);
}

/// An unwritable destination leaves the batch archives in place
#[tokio::test]
async fn test_bundle_failure_preserves_batch_archives() {
    let ws = Workspace::new();
    let blocked = ws.dir.path().join("not_a_dir");
    std::fs::write(&blocked, b"file").unwrap();

    let mut scheduler = ws.scheduler(Arc::new(ScriptedScreen::with_frames(2)));
    let settings = ws.settings(FAST_INTERVAL).with_destination(&blocked);
    scheduler
        .start(settings, Annotation::comment("Starting work"))
        .await
        .unwrap();
    assert!(wait_for_captures(&scheduler, 2).await);

    let state = scheduler
        .shutdown(Annotation::comment("done"))
        .await
        .unwrap();
    assert_eq!(state, SessionState::Stopped);

    let outcome = scheduler.last_outcome().unwrap();
    assert!(outcome.master_bundle.is_none());
    assert!(outcome.error.unwrap().starts_with("Master archive error"));
    assert_eq!(scheduler.status().level, StatusLevel::Error);

    let archives = scheduler.session_archives().await;
    assert_eq!(archives.len(), 1);
    assert!(archives[0].path.exists());
    assert_eq!(list_files(&ws.paths().archives_dir).len(), 1);
}

/// Stop must not wait out a long capture interval
#[tokio::test]
async fn test_stop_interrupts_sleeping_worker() {
    let ws = Workspace::new();
    let mut scheduler = ws.scheduler(Arc::new(ScriptedScreen::unlimited()));
    scheduler
        .start(
            ws.settings(Duration::from_secs(3600)),
            Annotation::comment("Starting work"),
        )
        .await
        .unwrap();
    assert!(wait_for_captures(&scheduler, 1).await);

    scheduler.stop(Annotation::comment("done")).await.unwrap();
    let state = tokio::time::timeout(Duration::from_secs(2), scheduler.wait_stopped())
        .await
        .expect("worker should exit promptly after stop");
    assert_eq!(state, SessionState::Stopped);
    assert!(scheduler.last_outcome().unwrap().master_bundle.is_some());
}

#[tokio::test]
async fn test_stop_from_paused_finishes_promptly() {
    let ws = Workspace::new();
    let mut scheduler = ws.scheduler(Arc::new(ScriptedScreen::unlimited()));
    scheduler
        .start(
            ws.settings(Duration::from_secs(3600)),
            Annotation::comment("Starting work"),
        )
        .await
        .unwrap();
    assert!(wait_for_captures(&scheduler, 1).await);
    scheduler.pause(Annotation::comment("break")).await.unwrap();

    let state = tokio::time::timeout(
        Duration::from_secs(2),
        scheduler.shutdown(Annotation::comment("done")),
    )
    .await
    .expect("paused worker should exit promptly after stop")
    .unwrap();
    assert_eq!(state, SessionState::Stopped);

    let kinds: Vec<EventKind> = scheduler.timeline().events().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![EventKind::Start, EventKind::Pause, EventKind::Stop]
    );
}

/// No capture lands in the batch while paused
#[tokio::test]
async fn test_paused_session_captures_nothing() {
    let ws = Workspace::new();
    let screen = Arc::new(ScriptedScreen::unlimited());
    let mut scheduler = ws.scheduler(screen.clone());
    scheduler
        .start(ws.settings(FAST_INTERVAL), Annotation::comment("Starting work"))
        .await
        .unwrap();
    assert!(wait_for_captures(&scheduler, 1).await);

    scheduler.pause(Annotation::comment("break")).await.unwrap();
    let attempts = screen.attempts();
    tokio::time::sleep(FAST_INTERVAL * 5).await;

    assert_eq!(screen.attempts(), attempts);
    assert_eq!(scheduler.pending_captures().await, 0);

    scheduler.shutdown(Annotation::comment("done")).await.unwrap();
}

#[tokio::test]
async fn test_cancelled_stop_changes_nothing() {
    let ws = Workspace::new();
    let mut scheduler = ws.scheduler(Arc::new(ScriptedScreen::unlimited()));
    scheduler
        .start(ws.settings(FAST_INTERVAL), Annotation::comment("Starting work"))
        .await
        .unwrap();
    assert!(wait_for_captures(&scheduler, 1).await);

    let err = scheduler.stop(Annotation::Cancelled).await.unwrap_err();
    assert!(matches!(err, SessionError::UserCancelled));
    assert_eq!(scheduler.state(), SessionState::Running);
    assert!(!scheduler.is_stopping());
    assert_eq!(scheduler.timeline().events().len(), 1);
    assert!(scheduler.session_archives().await.is_empty());

    scheduler.shutdown(Annotation::comment("done")).await.unwrap();
}

/// A second session after the first one finished starts from a clean slate
#[tokio::test]
async fn test_sessions_can_run_back_to_back() {
    let ws = Workspace::new();
    let mut scheduler = ws.scheduler(Arc::new(ScriptedScreen::unlimited()));

    for round in 0..2 {
        scheduler
            .start(
                ws.settings(FAST_INTERVAL),
                Annotation::comment(format!("round {round}")),
            )
            .await
            .unwrap();
        assert!(wait_for_captures(&scheduler, 1).await);
        scheduler.shutdown(Annotation::comment("done")).await.unwrap();
        assert_eq!(scheduler.timeline().events().len(), 2);
    }

    // Same description and window: the second bundle must not overwrite the first.
    assert_eq!(list_files(&ws.destination()).len(), 2);
}
