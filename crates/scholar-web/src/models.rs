use axum::response::sse::Event;
use scholar_core::{Milestone, Report};
use serde::Serialize;

use crate::session::SessionReport;
use crate::template;

/// The only failure text a browser ever sees. Details go to the log.
pub const GENERIC_FAILURE: &str = "Report generation failed. Please try again.";

// ── SSE events ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub milestone: &'static str,
    pub fraction: f32,
    pub label: &'static str,
}

impl From<Milestone> for ProgressEvent {
    fn from(m: Milestone) -> Self {
        Self {
            milestone: m.as_str(),
            fraction: m.fraction(),
            label: m.label(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorEvent {
    pub message: String,
}

impl ErrorEvent {
    pub fn generic() -> Self {
        Self {
            message: GENERIC_FAILURE.to_string(),
        }
    }
}

// ── Report view (`complete` event and `GET /report`) ────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
    /// `empty`, `ready` or `stale`.
    pub state: &'static str,
    pub title: Option<String>,
    pub markdown: String,
    pub html: String,
    pub degraded: Vec<String>,
    pub generated_at: Option<String>,
}

impl ReportView {
    pub fn from_session(session: &SessionReport) -> Self {
        match session.report() {
            Some(report) => Self::from_report(session.state_str(), report),
            None => Self::empty(),
        }
    }

    pub fn from_report(state: &'static str, report: &Report) -> Self {
        Self {
            state,
            title: Some(report.metadata.title.clone()),
            markdown: report.markdown.clone(),
            html: template::render_markdown(&report.markdown),
            degraded: report.degraded.iter().map(|d| d.to_string()).collect(),
            generated_at: Some(report.generated_at.to_rfc3339()),
        }
    }

    pub fn empty() -> Self {
        Self {
            state: SessionReport::Empty.state_str(),
            title: None,
            markdown: String::new(),
            html: String::new(),
            degraded: Vec::new(),
            generated_at: None,
        }
    }
}

pub fn sse_event<T: Serialize>(event_type: &str, data: &T) -> Event {
    Event::default()
        .event(event_type)
        .data(serde_json::to_string(data).unwrap_or_default())
}
