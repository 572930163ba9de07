//! Session lifecycle data: state, timeline, report and summarization

mod report;
mod state;
pub mod summary;
mod timeline;

pub use report::{format_active_time, format_duration, render_report, with_summary, SessionMetadata};
pub use state::SessionState;
pub use summary::{GeminiSummarizer, NoSummarizer, Summarizer};
pub use timeline::{
    Durations, EventKind, SessionTimeline, TimelineError, TimelineEvent,
};
