use anyhow::Context;
use axum::extract::{Multipart, State};
use axum::http::HeaderMap;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use scholar_core::{Milestone, Report};

use crate::models::*;
use crate::session;
use crate::state::AppState;
use crate::upload;

type EventSender = mpsc::Sender<Result<Event, Infallible>>;

/// Upload a PDF and stream progress, then the finished report, as SSE.
///
/// Generation runs in its own task and finishes even if the client goes
/// away, so the report is still waiting in the session on reload.
pub async fn stream(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let (session_id, cookie) = session::resolve(&state.sessions, &headers);
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(16);

    tokio::spawn(async move {
        match generate(&state, multipart, &tx).await {
            Ok(report) => {
                let report = Arc::new(report);
                if !state.sessions.store_report(&session_id, report.clone()) {
                    tracing::warn!(session = %session_id, "session ended before its report was ready");
                }
                tracing::info!(
                    session = %session_id,
                    title = %report.metadata.title,
                    degraded = report.degraded.len(),
                    "report ready"
                );
                let view = ReportView::from_report("ready", &report);
                let _ = tx.send(Ok(sse_event("complete", &view))).await;
            }
            Err(e) => {
                let detail = format!("{e:#}");
                tracing::error!(session = %session_id, error = %detail, "report generation failed");
                state.sessions.mark_failed(&session_id);
                let _ = tx
                    .send(Ok(sse_event("error", &ErrorEvent::generic())))
                    .await;
            }
        }
    });

    let sse = Sse::new(ReceiverStream::new(rx)).keep_alive(KeepAlive::default());
    session::with_cookie(sse.into_response(), cookie)
}

async fn generate(
    state: &AppState,
    multipart: Multipart,
    tx: &EventSender,
) -> anyhow::Result<Report> {
    let upload = upload::parse_multipart(multipart)
        .await
        .map_err(anyhow::Error::msg)?;

    send_progress(tx, Milestone::Parsing);
    let paper_text = scholar_ingest::stage_and_parse(state.parser.as_ref(), &upload)
        .await
        .with_context(|| format!("parsing {}", upload.filename))?;

    let tx_progress = tx.clone();
    let report = state
        .synthesizer
        .generate(&paper_text, move |m| send_progress(&tx_progress, m))
        .await?;
    Ok(report)
}

/// Progress is best effort: a full or closed channel drops the event.
fn send_progress(tx: &EventSender, milestone: Milestone) {
    let _ = tx.try_send(Ok(sse_event("progress", &ProgressEvent::from(milestone))));
}
