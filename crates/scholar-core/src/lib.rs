use chrono::{DateTime, Utc};
use thiserror::Error;

pub mod config;
pub mod config_file;
pub mod llm;
pub mod metadata;
pub mod mock;
pub mod prompts;
pub mod queries;
pub mod search;
pub mod synthesizer;
pub mod text_utils;

// Re-export for convenience
pub use config::Config;
pub use llm::{ChatModel, ChatRequest, LlmError, OpenAiCompatible};
pub use metadata::PaperMetadata;
pub use queries::{ResearchQueries, SearchTopic};
pub use search::{SearchError, Tavily, WebSearch};
pub use synthesizer::ReportSynthesizer;
pub use text_utils::truncate_chars;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("final report synthesis failed: {0}")]
    Synthesis(#[source] LlmError),
    #[error("configuration error: {0}")]
    Config(String),
}

/// Coarse progress milestones of one report generation.
///
/// `Parsing` is emitted by whoever drives ingestion; the synthesizer emits
/// the remaining four in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Milestone {
    Parsing,
    ReadingPaper,
    Searching,
    Synthesizing,
    Done,
}

impl Milestone {
    /// Fraction of the progress bar reached at this milestone.
    pub fn fraction(self) -> f32 {
        match self {
            Milestone::Parsing => 0.1,
            Milestone::ReadingPaper => 0.2,
            Milestone::Searching => 0.4,
            Milestone::Synthesizing => 0.8,
            Milestone::Done => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Milestone::Parsing => "parsing",
            Milestone::ReadingPaper => "reading_paper",
            Milestone::Searching => "searching",
            Milestone::Synthesizing => "synthesizing",
            Milestone::Done => "done",
        }
    }

    /// Status line shown next to the progress bar.
    pub fn label(self) -> &'static str {
        match self {
            Milestone::Parsing => "Running OCR and structure-aware parsing...",
            Milestone::ReadingPaper => "Reading the paper, extracting its core ideas and prior work...",
            Milestone::Searching => "Searching the web for the paper's lineage and impact...",
            Milestone::Synthesizing => "Tracing the academic lineage and writing the report...",
            Milestone::Done => "Analysis complete!",
        }
    }
}

/// A quality problem the run recovered from.
#[derive(Debug, Clone, PartialEq)]
pub enum Degradation {
    /// Metadata extraction failed and the default metadata was used.
    MetadataDefaults { reason: String },
    /// One search returned nothing usable; its topic went into the prompt empty.
    SearchFailed { topic: SearchTopic, reason: String },
}

impl std::fmt::Display for Degradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Degradation::MetadataDefaults { reason } => {
                write!(f, "Paper metadata could not be extracted ({reason}); defaults were used")
            }
            Degradation::SearchFailed { topic, reason } => {
                write!(f, "Web search for {} failed ({reason})", topic.label())
            }
        }
    }
}

/// A generated research report.
#[derive(Debug, Clone)]
pub struct Report {
    /// The model's Markdown output, verbatim.
    pub markdown: String,
    pub metadata: PaperMetadata,
    pub degraded: Vec<Degradation>,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}
