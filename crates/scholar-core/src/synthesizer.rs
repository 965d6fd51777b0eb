//! Report generation pipeline: metadata → four searches → final synthesis.
//!
//! Every stage runs sequentially. Metadata and search failures are recovered
//! from and recorded as [`Degradation`]s; a failed final synthesis call is
//! returned to the caller.

use std::sync::Arc;

use chrono::Utc;

use crate::llm::{ChatModel, ChatRequest};
use crate::metadata::{PaperMetadata, extract_metadata};
use crate::prompts::{TopicDigest, report_prompt};
use crate::queries::ResearchQueries;
use crate::search::WebSearch;
use crate::{CoreError, Degradation, Milestone, Report};

pub const DEFAULT_REPORT_LANGUAGE: &str = "English";
pub const DEFAULT_REPORT_TEMPERATURE: f32 = 0.5;

pub struct ReportSynthesizer {
    chat: Arc<dyn ChatModel>,
    search: Arc<dyn WebSearch>,
    language: String,
    temperature: f32,
}

impl ReportSynthesizer {
    pub fn new(chat: Arc<dyn ChatModel>, search: Arc<dyn WebSearch>) -> Self {
        Self {
            chat,
            search,
            language: DEFAULT_REPORT_LANGUAGE.to_string(),
            temperature: DEFAULT_REPORT_TEMPERATURE,
        }
    }

    /// Language the report is written in.
    pub fn with_language(mut self, language: String) -> Self {
        self.language = language;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Generate a report for `paper_text`, reporting milestones to `progress`.
    ///
    /// Emits `ReadingPaper`, `Searching`, `Synthesizing`, and `Done` (on
    /// success only), in that order.
    pub async fn generate<P>(&self, paper_text: &str, progress: P) -> Result<Report, CoreError>
    where
        P: Fn(Milestone) + Send + Sync,
    {
        let mut degraded = Vec::new();

        // Stage A: metadata
        progress(Milestone::ReadingPaper);
        let metadata = match extract_metadata(self.chat.as_ref(), paper_text).await {
            Ok(meta) => meta,
            Err(e) => {
                tracing::warn!(error = %e, "metadata extraction failed, using defaults");
                degraded.push(Degradation::MetadataDefaults {
                    reason: e.to_string(),
                });
                PaperMetadata::fallback()
            }
        };
        tracing::info!(
            title = %metadata.title,
            domain = %metadata.domain,
            baselines = %metadata.baselines_joined(),
            "paper metadata"
        );

        // Stage B: searches, one at a time
        progress(Milestone::Searching);
        let queries = ResearchQueries::from_metadata(&metadata);
        let mut digests = Vec::with_capacity(4);
        for (topic, query) in queries.in_order() {
            let digest = match self.search.search(query).await {
                Ok(text) => Some(text),
                Err(e) => {
                    tracing::warn!(
                        backend = self.search.name(),
                        topic = topic.label(),
                        error = %e,
                        "search failed, continuing without it"
                    );
                    degraded.push(Degradation::SearchFailed {
                        topic,
                        reason: e.to_string(),
                    });
                    None
                }
            };
            digests.push(TopicDigest { topic, digest });
        }

        // Stage C: final synthesis
        progress(Milestone::Synthesizing);
        let prompt = report_prompt(&metadata, &digests, paper_text, &self.language);
        let request = ChatRequest::text(prompt).with_temperature(self.temperature);
        let markdown = self
            .chat
            .complete(&request)
            .await
            .map_err(CoreError::Synthesis)?;

        tracing::info!(
            chars = markdown.chars().count(),
            degraded = degraded.len(),
            "report generated"
        );
        progress(Milestone::Done);

        Ok(Report {
            markdown,
            metadata,
            degraded,
            generated_at: Utc::now(),
        })
    }
}
