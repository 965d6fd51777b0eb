use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::models::ReportView;
use crate::session;
use crate::state::AppState;

pub const DOWNLOAD_FILENAME: &str = "research_report.md";

/// The session's current report, for redisplay after a page reload.
///
/// Unknown or missing sessions read as empty; no session is created here.
pub async fn current(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Json<ReportView> {
    let view = session::session_from_headers(&headers)
        .filter(|id| state.sessions.touch(id))
        .and_then(|id| state.sessions.get(&id))
        .map(|s| ReportView::from_session(&s))
        .unwrap_or_else(ReportView::empty);
    Json(view)
}

/// The stored Markdown, byte for byte, as a file download.
pub async fn download(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let report = session::session_from_headers(&headers)
        .and_then(|id| state.sessions.get(&id))
        .and_then(|s| s.report().cloned());

    match report {
        Some(report) => (
            [
                (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{DOWNLOAD_FILENAME}\""),
                ),
            ],
            report.markdown.clone(),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            "No report has been generated in this session yet.",
        )
            .into_response(),
    }
}

/// Drop the current session and start a fresh one.
pub async fn reset(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(old) = session::session_from_headers(&headers) {
        state.sessions.remove(&old);
        tracing::debug!(session = %old, "session reset");
    }
    let id = state.sessions.create();
    session::with_cookie(
        Json(ReportView::empty()).into_response(),
        session::cookie_header(&id),
    )
}
