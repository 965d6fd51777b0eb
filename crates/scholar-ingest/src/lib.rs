use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use thiserror::Error;

pub mod llamaparse;
pub mod upload;

pub use llamaparse::LlamaParse;
pub use upload::{UploadedFile, check_pdf, stage_and_parse};

/// Failure modes of document ingestion.
///
/// The `Display` strings keep the human-readable `Error:` / `Parsing error:`
/// prefixes so they read naturally in logs.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Parsing error: HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Parsing error: service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Parsing error: job {job_id} ended with status {status}")]
    Job { job_id: String, status: String },
    #[error("Parsing error: job {job_id} did not finish within {waited_secs}s")]
    Timeout { job_id: String, waited_secs: u64 },
    #[error("Error: No text extracted from PDF.")]
    Empty,
    #[error("Error: {0}")]
    Unsupported(String),
    #[error("Parsing error: IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Boxed future returned by [`DocumentParser::parse`].
pub type ParseFuture<'a> = Pin<Box<dyn Future<Output = Result<String, IngestError>> + Send + 'a>>;

/// A document parsing backend that turns a PDF on disk into Markdown text.
pub trait DocumentParser: Send + Sync {
    /// Human-readable backend name, used in logs.
    fn name(&self) -> &str;

    /// Parse the file at `path` and return its concatenated text.
    fn parse<'a>(&'a self, path: &'a Path) -> ParseFuture<'a>;
}

/// Join document fragments with blank lines.
///
/// Blank fragments are dropped. If nothing is left the document is
/// considered empty.
pub fn join_fragments<I, S>(fragments: I) -> Result<String, IngestError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parts: Vec<String> = fragments
        .into_iter()
        .map(|f| f.as_ref().to_string())
        .filter(|f| !f.trim().is_empty())
        .collect();

    if parts.is_empty() {
        return Err(IngestError::Empty);
    }
    Ok(parts.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_joined_with_blank_lines() {
        let text = join_fragments(["# Intro", "Body text", "## Method"]).unwrap();
        assert_eq!(text, "# Intro\n\nBody text\n\n## Method");
    }

    #[test]
    fn blank_fragments_are_skipped() {
        let text = join_fragments(["page one", "   ", "", "page three"]).unwrap();
        assert_eq!(text, "page one\n\npage three");
    }

    #[test]
    fn no_fragments_is_empty_error() {
        let err = join_fragments(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, IngestError::Empty));
        assert_eq!(err.to_string(), "Error: No text extracted from PDF.");
    }

    #[test]
    fn error_messages_keep_prefixes() {
        let err = IngestError::Status {
            status: 401,
            body: "invalid api key".into(),
        };
        assert!(err.to_string().starts_with("Parsing error:"));
    }
}
