//! Tavily search API backend.
//!
//! Uses the "advanced" (deep) search mode with a bounded result count.
//! No retry or backoff: a failed call is reported once and the caller
//! decides what to do with it.

use serde::{Deserialize, Serialize};

use super::{SearchError, SearchFuture, SearchHit, WebSearch, format_digest};

pub const DEFAULT_BASE_URL: &str = "https://api.tavily.com";
pub const DEFAULT_MAX_RESULTS: u32 = 5;
pub const DEFAULT_SEARCH_DEPTH: &str = "advanced";

#[derive(Clone)]
pub struct Tavily {
    api_key: String,
    base_url: String,
    max_results: u32,
    search_depth: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for Tavily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tavily")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("max_results", &self.max_results)
            .field("search_depth", &self.search_depth)
            .finish()
    }
}

impl Tavily {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            search_depth: DEFAULT_SEARCH_DEPTH.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    pub fn with_search_depth(mut self, depth: String) -> Self {
        self.search_depth = depth;
        self
    }

    fn url(&self) -> String {
        format!("{}/search", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    search_depth: &'a str,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    results: Option<Vec<TavilyResult>>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    title: Option<String>,
    url: Option<String>,
    content: Option<String>,
}

impl From<TavilyResult> for SearchHit {
    fn from(r: TavilyResult) -> Self {
        SearchHit {
            title: r.title,
            url: r.url,
            content: r.content,
        }
    }
}

/// Turn a raw Tavily response body into a digest.
fn digest_from_body(body: &str) -> Result<String, SearchError> {
    let data: TavilyResponse =
        serde_json::from_str(body).map_err(|e| SearchError::Decode(e.to_string()))?;
    let hits: Vec<SearchHit> = data
        .results
        .ok_or(SearchError::NoResults)?
        .into_iter()
        .map(SearchHit::from)
        .collect();
    format_digest(&hits)
}

impl WebSearch for Tavily {
    fn name(&self) -> &str {
        "Tavily"
    }

    fn search<'a>(&'a self, query: &'a str) -> SearchFuture<'a> {
        Box::pin(async move {
            tracing::info!(query, "searching the web");

            let body = TavilyRequest {
                query,
                search_depth: &self.search_depth,
                max_results: self.max_results,
            };
            let resp = self
                .client
                .post(self.url())
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await?;

            let status = resp.status();
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(SearchError::Auth(status.as_u16()));
            }
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(SearchError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            let text = resp.text().await?;
            digest_from_body(&text)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_results_with_missing_fields() {
        let body = r#"{
            "query": "transformers",
            "results": [
                {"title": "Paper A", "url": "https://a.example", "content": "About A", "score": 0.9},
                {"url": "https://b.example"}
            ]
        }"#;
        let digest = digest_from_body(body).unwrap();
        assert!(digest.starts_with("Source: Paper A\nURL: https://a.example\nContent: About A\n"));
        assert!(digest.contains("\n---\nSource: No Title\nURL: https://b.example\nContent: No Content\n"));
    }

    #[test]
    fn missing_results_key_is_no_results() {
        let err = digest_from_body(r#"{"answer": null}"#).unwrap_err();
        assert!(matches!(err, SearchError::NoResults));
    }

    #[test]
    fn empty_results_is_no_results() {
        let err = digest_from_body(r#"{"results": []}"#).unwrap_err();
        assert!(matches!(err, SearchError::NoResults));
    }

    #[test]
    fn garbage_body_is_decode_error() {
        let err = digest_from_body("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, SearchError::Decode(_)));
        assert!(err.to_string().starts_with("Search error:"));
    }

    #[test]
    fn request_body_shape() {
        let req = TavilyRequest {
            query: "q",
            search_depth: DEFAULT_SEARCH_DEPTH,
            max_results: DEFAULT_MAX_RESULTS,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"query": "q", "search_depth": "advanced", "max_results": 5})
        );
    }

    #[tokio::test]
    async fn unreachable_service_returns_error_not_panic() {
        let tavily = Tavily::new("tvly-test".into()).with_base_url("http://127.0.0.1:9".into());
        let result = tavily.search("anything").await;
        assert!(matches!(result, Err(SearchError::Http(_))));
    }
}
