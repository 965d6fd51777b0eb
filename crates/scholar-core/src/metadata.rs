//! Structured metadata extraction from the paper's opening text.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use crate::llm::{ChatModel, ChatRequest, LlmError};
use crate::text_utils::{METADATA_EXCERPT_CHARS, truncate_chars};

pub const FALLBACK_TITLE: &str = "Uploaded Paper";
pub const FALLBACK_DOMAIN: &str = "Computer Science";
pub const FALLBACK_BASELINES: &str = "Previous Standard Works";

/// Used when the model answers but leaves a field out.
const MISSING_TITLE: &str = "Target Paper";
const MISSING_DOMAIN: &str = "AI Research";

/// What the rest of the pipeline needs to know about a paper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperMetadata {
    pub title: String,
    pub domain: String,
    pub keywords: Vec<String>,
    pub baselines: Vec<String>,
}

impl PaperMetadata {
    /// Defaults used when extraction fails outright.
    pub fn fallback() -> Self {
        Self {
            title: FALLBACK_TITLE.to_string(),
            domain: FALLBACK_DOMAIN.to_string(),
            keywords: vec![],
            baselines: vec![FALLBACK_BASELINES.to_string()],
        }
    }

    /// Baselines as a comma-separated list for prompts and queries.
    pub fn baselines_joined(&self) -> String {
        self.baselines.join(", ")
    }
}

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("completion call failed: {0}")]
    Llm(#[from] LlmError),
    #[error("response was not valid metadata JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Accepts a list or a single string. Non-string items and other shapes are
/// dropped instead of failing the whole answer.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Value::deserialize(deserializer)? {
        Value::String(s) => vec![s],
        Value::Array(values) => values
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    title: Option<String>,
    domain: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    keywords: Vec<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    baselines: Vec<String>,
}

static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(\{.*\})\s*```").unwrap());

/// Build the extraction prompt from the first 15,000 characters of the paper.
pub fn extraction_prompt(paper_text: &str) -> String {
    format!(
        r#"Read the following paper content and extract the key information below. Reply with a JSON object only.
1. "title": the paper title
2. "domain": the specific research field
3. "keywords": exactly 3 core method keywords
4. "baselines": 2-3 core baseline models or foundational prior works the paper explicitly builds on (paper names or method names)

[Paper content excerpt]:
{}"#,
        truncate_chars(paper_text, METADATA_EXCERPT_CHARS)
    )
}

/// Parse the model's answer into metadata.
///
/// Accepts bare JSON or JSON wrapped in a fenced code block. Blank or
/// missing title/domain get the "missing field" defaults.
pub fn parse_metadata(response: &str) -> Result<PaperMetadata, serde_json::Error> {
    let json = FENCED_JSON
        .captures(response)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or_else(|| response.trim());

    let raw: RawMetadata = serde_json::from_str(json)?;

    let non_blank = |s: Option<String>| s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    Ok(PaperMetadata {
        title: non_blank(raw.title).unwrap_or_else(|| MISSING_TITLE.to_string()),
        domain: non_blank(raw.domain).unwrap_or_else(|| MISSING_DOMAIN.to_string()),
        keywords: raw.keywords,
        baselines: raw.baselines,
    })
}

/// Ask the model for the paper's metadata.
pub async fn extract_metadata(
    chat: &dyn ChatModel,
    paper_text: &str,
) -> Result<PaperMetadata, MetadataError> {
    let request = ChatRequest::json(extraction_prompt(paper_text));
    let response = chat.complete(&request).await?;
    Ok(parse_metadata(&response)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_response() {
        let meta = parse_metadata(
            r#"{"title":"Attention Is All You Need","domain":"Machine Translation",
                "keywords":["self-attention","transformer","positional encoding"],
                "baselines":["Seq2Seq","ConvS2S"]}"#,
        )
        .unwrap();
        assert_eq!(meta.title, "Attention Is All You Need");
        assert_eq!(meta.domain, "Machine Translation");
        assert_eq!(meta.keywords.len(), 3);
        assert_eq!(meta.baselines_joined(), "Seq2Seq, ConvS2S");
    }

    #[test]
    fn baselines_as_single_string() {
        let meta = parse_metadata(r#"{"title":"T","domain":"D","baselines":"ResNet"}"#).unwrap();
        assert_eq!(meta.baselines, vec!["ResNet".to_string()]);
        assert!(meta.keywords.is_empty());
    }

    #[test]
    fn odd_keyword_shapes_keep_the_rest() {
        let meta = parse_metadata(
            r#"{"title":"LoRA","domain":"NLP","keywords":[{"term":"low-rank"}],"baselines":["Adapters"]}"#,
        )
        .unwrap();
        assert_eq!(meta.title, "LoRA");
        assert_eq!(meta.domain, "NLP");
        assert!(meta.keywords.is_empty());
        assert_eq!(meta.baselines, vec!["Adapters".to_string()]);
    }

    #[test]
    fn non_string_items_dropped() {
        let meta = parse_metadata(
            r#"{"title":"T","domain":"D","keywords":["a",3,null," "],"baselines":{"name":"X"}}"#,
        )
        .unwrap();
        assert_eq!(meta.keywords, vec!["a".to_string()]);
        assert!(meta.baselines.is_empty());
    }

    #[test]
    fn null_lists_are_empty() {
        let meta = parse_metadata(r#"{"title":"T","keywords":null,"baselines":null}"#).unwrap();
        assert!(meta.keywords.is_empty());
        assert!(meta.baselines.is_empty());
    }

    #[test]
    fn missing_fields_get_placeholders() {
        let meta = parse_metadata("{}").unwrap();
        assert_eq!(meta.title, "Target Paper");
        assert_eq!(meta.domain, "AI Research");
        assert!(meta.baselines.is_empty());
    }

    #[test]
    fn blank_title_counts_as_missing() {
        let meta = parse_metadata(r#"{"title":"  ","domain":"Vision"}"#).unwrap();
        assert_eq!(meta.title, "Target Paper");
        assert_eq!(meta.domain, "Vision");
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let meta = parse_metadata("Sure!\n```json\n{\"title\": \"LoRA\", \"domain\": \"NLP\"}\n```\n")
            .unwrap();
        assert_eq!(meta.title, "LoRA");
    }

    #[test]
    fn prose_is_rejected() {
        assert!(parse_metadata("I could not find a title.").is_err());
        assert!(parse_metadata("").is_err());
    }

    #[test]
    fn fallback_values() {
        let meta = PaperMetadata::fallback();
        assert_eq!(meta.title, "Uploaded Paper");
        assert_eq!(meta.domain, "Computer Science");
        assert_eq!(meta.baselines_joined(), "Previous Standard Works");
    }

    #[test]
    fn prompt_uses_first_15000_chars() {
        let text = format!("{}{}", "α".repeat(METADATA_EXCERPT_CHARS), "β".repeat(10));
        let prompt = extraction_prompt(&text);
        assert!(prompt.contains(&"α".repeat(METADATA_EXCERPT_CHARS)));
        assert!(!prompt.contains('β'));
    }
}
