//! Plain-text session report (stored as readme.txt in the master bundle)

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::SessionTimeline;

/// Who did the work and for which ticket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub name: String,
    pub company: String,
    pub description: String,
    pub ticket_id: String,
    pub ticket_link: String,
}

fn or_na(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        "N/A"
    } else {
        trimmed
    }
}

fn split_hms(d: Duration) -> (i64, i64, i64) {
    let total = d.num_seconds().max(0);
    (total / 3600, (total % 3600) / 60, total % 60)
}

/// `1h 2m 3s`
pub fn format_duration(d: Duration) -> String {
    let (h, m, s) = split_hms(d);
    format!("{h}h {m}m {s}s")
}

/// `1 hours, 2 minutes, and 3 seconds.`
pub fn format_active_time(d: Duration) -> String {
    let (h, m, s) = split_hms(d);
    format!("{h} hours, {m} minutes, and {s} seconds.")
}

/// Render the report body: metadata, computed durations, then the timeline.
pub fn render_report(meta: &SessionMetadata, timeline: &SessionTimeline) -> String {
    let durations = timeline.summarize();

    let mut lines = vec![
        format!("Support Name: {}", meta.name),
        format!("The company the support is working under: {}", meta.company),
        format!("Description: {}", or_na(&meta.description)),
        format!("Support Ticket ID: {}", or_na(&meta.ticket_id)),
        format!("Support Ticket Link: {}", or_na(&meta.ticket_link)),
        String::new(),
        "--- Session Summary ---".to_string(),
        format!("Total Duration:       {}", format_duration(durations.total)),
        format!("Active Capture Time:  {}", format_duration(durations.active)),
        format!("Paused Time:          {}", format_duration(durations.paused)),
        String::new(),
        "--- Session Timeline ---".to_string(),
        String::new(),
    ];
    for event in timeline.events() {
        lines.push(format!(
            "{} - {}: {}",
            event.at.format("%Y-%m-%d %H:%M:%S"),
            event.kind.report_label(),
            event.comment
        ));
    }
    lines.join("\n")
}

/// Prepend a synopsis section to a rendered report
pub fn with_summary(summary: &str, body: &str) -> String {
    format!("--- AI Summary ---\n{}\n\n{}", summary.trim(), body)
}
