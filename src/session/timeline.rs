//! Append-only log of session lifecycle events

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Start,
    Pause,
    Resume,
    Stop,
}

impl EventKind {
    /// Label used in the session report
    pub fn report_label(&self) -> &'static str {
        match self {
            EventKind::Start => "Session Start",
            EventKind::Pause => "Pause",
            EventKind::Resume => "Resume",
            EventKind::Stop => "Session Stop",
        }
    }

    /// Whether capture is running in the interval that follows this event
    pub fn opens_active_interval(&self) -> bool {
        matches!(self, EventKind::Start | EventKind::Resume)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub kind: EventKind,
    pub at: DateTime<Local>,
    pub comment: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimelineError {
    #[error("{next:?} cannot follow {last:?}")]
    InvalidTransition {
        last: Option<EventKind>,
        next: EventKind,
    },
}

/// Totals computed from the event log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Durations {
    pub total: Duration,
    pub active: Duration,
    pub paused: Duration,
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            total: Duration::zero(),
            active: Duration::zero(),
            paused: Duration::zero(),
        }
    }
}

/// Ordered Start / Pause / Resume / Stop events of one session
#[derive(Debug, Clone, Default)]
pub struct SessionTimeline {
    events: Vec<TimelineEvent>,
}

impl SessionTimeline {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Record an event stamped with the current time
    pub fn record(&mut self, kind: EventKind, comment: impl Into<String>) -> Result<(), TimelineError> {
        self.record_at(kind, Local::now(), comment)
    }

    /// Record an event at an explicit time.
    ///
    /// Only the lifecycle order Start (Pause Resume)* [Pause] Stop is accepted.
    pub fn record_at(
        &mut self,
        kind: EventKind,
        at: DateTime<Local>,
        comment: impl Into<String>,
    ) -> Result<(), TimelineError> {
        let last = self.events.last().map(|e| e.kind);
        let valid = matches!(
            (last, kind),
            (None, EventKind::Start)
                | (Some(EventKind::Start), EventKind::Pause)
                | (Some(EventKind::Resume), EventKind::Pause)
                | (Some(EventKind::Pause), EventKind::Resume)
                | (Some(EventKind::Start), EventKind::Stop)
                | (Some(EventKind::Resume), EventKind::Stop)
                | (Some(EventKind::Pause), EventKind::Stop)
        );
        if !valid {
            return Err(TimelineError::InvalidTransition { last, next: kind });
        }
        self.events.push(TimelineEvent {
            kind,
            at,
            comment: comment.into(),
        });
        Ok(())
    }

    pub fn events(&self) -> &[TimelineEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.events.first().map(|e| e.at)
    }

    pub fn last_at(&self) -> Option<DateTime<Local>> {
        self.events.last().map(|e| e.at)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.events.last(), Some(e) if e.kind == EventKind::Stop)
    }

    /// Comment of the most recent Start or Resume event
    pub fn last_active_comment(&self) -> Option<&str> {
        self.events
            .iter()
            .rev()
            .find(|e| e.kind.opens_active_interval())
            .map(|e| e.comment.as_str())
    }

    /// Active time is the sum of intervals opened by Start/Resume, paused
    /// time the sum of intervals opened by Pause. Each interval ends at the
    /// next event.
    pub fn summarize(&self) -> Durations {
        let mut durations = Durations::default();
        let (Some(first), Some(last)) = (self.events.first(), self.events.last()) else {
            return durations;
        };
        durations.total = last.at - first.at;

        for pair in self.events.windows(2) {
            let delta = pair[1].at - pair[0].at;
            match pair[0].kind {
                EventKind::Start | EventKind::Resume => durations.active += delta,
                EventKind::Pause => durations.paused += delta,
                EventKind::Stop => {}
            }
        }
        durations
    }
}
