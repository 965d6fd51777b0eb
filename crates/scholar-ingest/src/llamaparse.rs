//! LlamaParse client.
//!
//! Uploads a PDF, polls the parsing job until it settles, and fetches the
//! per-page Markdown result. Each page is one document fragment.

use std::path::Path;
use std::time::{Duration, Instant};

use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::{DocumentParser, IngestError, ParseFuture, join_fragments};

pub const DEFAULT_BASE_URL: &str = "https://api.cloud.llamaindex.ai";
pub const DEFAULT_LANGUAGE: &str = "en";

/// LlamaParse backend configured for Markdown output.
#[derive(Clone)]
pub struct LlamaParse {
    api_key: String,
    base_url: String,
    language: String,
    poll_interval: Duration,
    max_wait: Duration,
    client: reqwest::Client,
}

impl std::fmt::Debug for LlamaParse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlamaParse")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("language", &self.language)
            .field("poll_interval", &self.poll_interval)
            .field("max_wait", &self.max_wait)
            .finish()
    }
}

impl LlamaParse {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            poll_interval: Duration::from_secs(2),
            max_wait: Duration::from_secs(600),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Source language hint passed to the OCR step.
    pub fn with_language(mut self, language: String) -> Self {
        self.language = language;
        self
    }

    pub fn with_polling(mut self, interval: Duration, max_wait: Duration) -> Self {
        self.poll_interval = interval;
        self.max_wait = max_wait;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/parsing/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn upload(&self, path: &Path) -> Result<String, IngestError> {
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.pdf")
            .to_string();

        let part = Part::bytes(data)
            .file_name(file_name)
            .mime_str("application/pdf")?;
        let form = Form::new()
            .part("file", part)
            .text("language", self.language.clone())
            .text("result_type", "markdown");

        let resp = self
            .client
            .post(self.endpoint("upload"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let job: JobResponse = ensure_success(resp).await?.json().await?;
        Ok(job.id)
    }

    async fn wait_for_job(&self, job_id: &str) -> Result<(), IngestError> {
        let started = Instant::now();
        loop {
            let resp = self
                .client
                .get(self.endpoint(&format!("job/{job_id}")))
                .bearer_auth(&self.api_key)
                .send()
                .await?;
            let job: JobResponse = ensure_success(resp).await?.json().await?;

            match JobState::from_status(&job.status) {
                JobState::Done => return Ok(()),
                JobState::Failed => {
                    return Err(IngestError::Job {
                        job_id: job_id.to_string(),
                        status: job.status,
                    });
                }
                JobState::Pending => {}
            }

            if started.elapsed() >= self.max_wait {
                return Err(IngestError::Timeout {
                    job_id: job_id.to_string(),
                    waited_secs: started.elapsed().as_secs(),
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn fetch_result(&self, job_id: &str) -> Result<String, IngestError> {
        let resp = self
            .client
            .get(self.endpoint(&format!("job/{job_id}/result/json")))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let result: JsonResult = ensure_success(resp).await?.json().await?;
        join_fragments(result.pages.into_iter().map(Page::into_text))
    }
}

impl DocumentParser for LlamaParse {
    fn name(&self) -> &str {
        "LlamaParse"
    }

    fn parse<'a>(&'a self, path: &'a Path) -> ParseFuture<'a> {
        Box::pin(async move {
            tracing::info!(path = %path.display(), "uploading document to LlamaParse");
            let job_id = self.upload(path).await?;
            tracing::debug!(job_id, "parse job submitted");

            self.wait_for_job(&job_id).await?;
            let text = self.fetch_result(&job_id).await?;
            tracing::info!(job_id, chars = text.chars().count(), "document parsed");
            Ok(text)
        })
    }
}

async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, IngestError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(IngestError::Status {
        status: status.as_u16(),
        body,
    })
}

#[derive(Debug, PartialEq, Eq)]
enum JobState {
    Pending,
    Done,
    Failed,
}

impl JobState {
    fn from_status(status: &str) -> Self {
        match status.to_ascii_uppercase().as_str() {
            "SUCCESS" | "PARTIAL_SUCCESS" => JobState::Done,
            "ERROR" | "CANCELED" | "CANCELLED" => JobState::Failed,
            _ => JobState::Pending,
        }
    }
}

#[derive(Debug, Deserialize)]
struct JobResponse {
    id: String,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct JsonResult {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    md: Option<String>,
    text: Option<String>,
}

impl Page {
    /// Prefer the Markdown rendering, fall back to plain text.
    fn into_text(self) -> String {
        match self.md {
            Some(md) if !md.trim().is_empty() => md,
            _ => self.text.unwrap_or_default(),
        }
    }
}
