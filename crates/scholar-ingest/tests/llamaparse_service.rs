//! Drives the full upload → poll → result flow of [`LlamaParse`] against a
//! local axum server standing in for the parsing service.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use scholar_ingest::{DocumentParser, IngestError, LlamaParse};
use serde_json::{Value, json};

const API_KEY: &str = "llx-test";

struct Service {
    base_url: String,
    polls: Arc<AtomicUsize>,
}

/// Serve a job that always reports `status` and, once done, `result`.
async fn spawn_service(status: &'static str, result: Value) -> Service {
    let polls = Arc::new(AtomicUsize::new(0));
    let poll_counter = polls.clone();

    let app = Router::new()
        .route(
            "/api/parsing/upload",
            post(|headers: HeaderMap| async move {
                let expected = format!("Bearer {API_KEY}");
                let authorized = headers
                    .get(header::AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    == Some(expected.as_str());
                if !authorized {
                    return Err(StatusCode::UNAUTHORIZED);
                }
                Ok(Json(json!({ "id": "job-1", "status": "PENDING" })))
            }),
        )
        .route(
            "/api/parsing/job/{id}",
            get(move || {
                poll_counter.fetch_add(1, Ordering::SeqCst);
                async move { Json(json!({ "id": "job-1", "status": status })) }
            }),
        )
        .route(
            "/api/parsing/job/{id}/result/json",
            get(move || {
                let result = result.clone();
                async move { Json(result) }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Service {
        base_url: format!("http://{addr}"),
        polls,
    }
}

fn parser(service: &Service, api_key: &str) -> LlamaParse {
    LlamaParse::new(api_key.to_string())
        .with_base_url(service.base_url.clone())
        .with_polling(Duration::from_millis(1), Duration::from_millis(5))
}

fn staged_pdf() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("upload.pdf");
    std::fs::write(&path, b"%PDF-1.7\n% test\n").unwrap();
    (dir, path)
}

#[tokio::test]
async fn successful_job_joins_pages() {
    let service = spawn_service(
        "SUCCESS",
        json!({ "pages": [
            { "page": 1, "md": "# LoRA", "text": "LoRA" },
            { "page": 2, "md": "", "text": "Low-rank adaptation." }
        ]}),
    )
    .await;
    let (_dir, path) = staged_pdf();

    let text = parser(&service, API_KEY).parse(&path).await.unwrap();

    assert_eq!(text, "# LoRA\n\nLow-rank adaptation.");
    assert_eq!(service.polls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_job_is_job_error() {
    let service = spawn_service("ERROR", json!({})).await;
    let (_dir, path) = staged_pdf();

    let err = parser(&service, API_KEY).parse(&path).await.unwrap_err();

    match err {
        IngestError::Job { job_id, status } => {
            assert_eq!(job_id, "job-1");
            assert_eq!(status, "ERROR");
        }
        other => panic!("expected Job error, got {other:?}"),
    }
}

#[tokio::test]
async fn job_that_never_finishes_times_out() {
    let service = spawn_service("PENDING", json!({})).await;
    let (_dir, path) = staged_pdf();

    let err = parser(&service, API_KEY).parse(&path).await.unwrap_err();

    assert!(matches!(err, IngestError::Timeout { ref job_id, .. } if job_id == "job-1"));
    assert!(service.polls.load(Ordering::SeqCst) >= 1);
}

#[tokio::test]
async fn successful_job_without_text_is_empty() {
    let service = spawn_service("SUCCESS", json!({ "pages": [{ "page": 1, "text": " " }] })).await;
    let (_dir, path) = staged_pdf();

    let err = parser(&service, API_KEY).parse(&path).await.unwrap_err();

    assert!(matches!(err, IngestError::Empty));
}

#[tokio::test]
async fn rejected_key_is_status_error() {
    let service = spawn_service("SUCCESS", json!({})).await;
    let (_dir, path) = staged_pdf();

    let err = parser(&service, "wrong-key").parse(&path).await.unwrap_err();

    assert!(matches!(err, IngestError::Status { status: 401, .. }));
    assert_eq!(service.polls.load(Ordering::SeqCst), 0);
}
