//! Runtime configuration resolved from environment and config files.
//!
//! Precedence: environment variables > CWD config file > platform config
//! file > built-in defaults. API keys are required.

use crate::CoreError;
use crate::config_file::ConfigFile;
use crate::llm::openai;
use crate::search::tavily;
use crate::synthesizer::{DEFAULT_REPORT_LANGUAGE, DEFAULT_REPORT_TEMPERATURE};

pub const DEFAULT_BIND: &str = "0.0.0.0:5001";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;
pub const DEFAULT_PARSE_BASE_URL: &str = "https://api.cloud.llamaindex.ai";
pub const DEFAULT_PARSE_LANGUAGE: &str = "en";

/// Everything needed to build the three service clients and the server.
#[derive(Clone)]
pub struct Config {
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub report_language: String,
    pub report_temperature: f32,
    pub search_api_key: String,
    pub search_base_url: String,
    pub search_max_results: u32,
    pub search_depth: String,
    pub parse_api_key: String,
    pub parse_base_url: String,
    pub parse_language: String,
    pub parse_poll_interval_secs: u64,
    pub parse_max_wait_secs: u64,
    pub bind_addr: String,
    pub max_upload_mb: usize,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("llm_api_key", &"***")
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field("report_language", &self.report_language)
            .field("report_temperature", &self.report_temperature)
            .field("search_api_key", &"***")
            .field("search_base_url", &self.search_base_url)
            .field("search_max_results", &self.search_max_results)
            .field("search_depth", &self.search_depth)
            .field("parse_api_key", &"***")
            .field("parse_base_url", &self.parse_base_url)
            .field("parse_language", &self.parse_language)
            .field("parse_poll_interval_secs", &self.parse_poll_interval_secs)
            .field("parse_max_wait_secs", &self.parse_max_wait_secs)
            .field("bind_addr", &self.bind_addr)
            .field("max_upload_mb", &self.max_upload_mb)
            .finish()
    }
}

impl Config {
    /// Resolve configuration from a loaded config file and an environment
    /// lookup (usually `|k| std::env::var(k).ok()`).
    pub fn resolve(
        file: &ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, CoreError> {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        let keys = file.api_keys.clone().unwrap_or_default();
        let llm = file.llm.clone().unwrap_or_default();
        let search = file.search.clone().unwrap_or_default();
        let parsing = file.parsing.clone().unwrap_or_default();
        let server = file.server.clone().unwrap_or_default();

        let required = |var: &str, from_file: Option<String>| {
            env(var).or(from_file).ok_or_else(|| {
                CoreError::Config(format!(
                    "{var} is not set (export it or add it to .env / the config file)"
                ))
            })
        };

        Ok(Config {
            llm_api_key: required("DEEPSEEK_API_KEY", keys.llm_api_key)?,
            llm_base_url: env("DEEPSEEK_BASE_URL")
                .or(llm.base_url)
                .unwrap_or_else(|| openai::DEFAULT_BASE_URL.to_string()),
            llm_model: env("SCHOLAR_MODEL")
                .or(llm.model)
                .unwrap_or_else(|| openai::DEFAULT_MODEL.to_string()),
            report_language: llm
                .report_language
                .unwrap_or_else(|| DEFAULT_REPORT_LANGUAGE.to_string()),
            report_temperature: llm.temperature.unwrap_or(DEFAULT_REPORT_TEMPERATURE),
            search_api_key: required("TAVILY_API_KEY", keys.search_api_key)?,
            search_base_url: search
                .base_url
                .unwrap_or_else(|| tavily::DEFAULT_BASE_URL.to_string()),
            search_max_results: search.max_results.unwrap_or(tavily::DEFAULT_MAX_RESULTS),
            search_depth: search
                .depth
                .unwrap_or_else(|| tavily::DEFAULT_SEARCH_DEPTH.to_string()),
            parse_api_key: required("LLAMA_CLOUD_API_KEY", keys.parse_api_key)?,
            parse_base_url: parsing
                .base_url
                .unwrap_or_else(|| DEFAULT_PARSE_BASE_URL.to_string()),
            parse_language: parsing
                .language
                .unwrap_or_else(|| DEFAULT_PARSE_LANGUAGE.to_string()),
            parse_poll_interval_secs: parsing.poll_interval_secs.unwrap_or(2).max(1),
            parse_max_wait_secs: parsing.max_wait_secs.unwrap_or(600),
            bind_addr: env("SCHOLAR_BIND")
                .or(server.bind)
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
            max_upload_mb: server.max_upload_mb.unwrap_or(DEFAULT_MAX_UPLOAD_MB),
        })
    }
}
