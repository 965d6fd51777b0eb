//! Web search backends used to gather context about a paper.

pub mod tavily;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

pub use tavily::Tavily;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search error: HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Search error: authentication rejected (HTTP {0})")]
    Auth(u16),
    #[error("Search error: HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Search error: malformed response: {0}")]
    Decode(String),
    #[error("No results found.")]
    NoResults,
}

/// Boxed future returned by [`WebSearch::search`].
pub type SearchFuture<'a> = Pin<Box<dyn Future<Output = Result<String, SearchError>> + Send + 'a>>;

/// A web search backend.
///
/// `Ok` always carries a non-empty, human-readable digest of the results.
pub trait WebSearch: Send + Sync {
    /// The canonical name of this backend (e.g., "Tavily").
    fn name(&self) -> &str;

    /// Run one free-text query.
    fn search<'a>(&'a self, query: &'a str) -> SearchFuture<'a>;
}

/// One search hit with the fields a digest shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHit {
    pub title: Option<String>,
    pub url: Option<String>,
    pub content: Option<String>,
}

/// Render hits as `Source/URL/Content` blocks separated by horizontal rules.
pub fn format_digest(hits: &[SearchHit]) -> Result<String, SearchError> {
    if hits.is_empty() {
        return Err(SearchError::NoResults);
    }

    let blocks: Vec<String> = hits
        .iter()
        .map(|hit| {
            format!(
                "Source: {}\nURL: {}\nContent: {}\n",
                hit.title.as_deref().unwrap_or("No Title"),
                hit.url.as_deref().unwrap_or("#"),
                hit.content.as_deref().unwrap_or("No Content"),
            )
        })
        .collect();

    Ok(blocks.join("\n---\n"))
}
