use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub api_keys: Option<ApiKeysConfig>,
    pub llm: Option<LlmConfig>,
    pub search: Option<SearchConfig>,
    pub parsing: Option<ParsingConfig>,
    pub server: Option<ServerConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiKeysConfig {
    pub llm_api_key: Option<String>,
    pub search_api_key: Option<String>,
    pub parse_api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub report_language: Option<String>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    pub base_url: Option<String>,
    pub max_results: Option<u32>,
    pub depth: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsingConfig {
    pub base_url: Option<String>,
    pub language: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub max_wait_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
    pub max_upload_mb: Option<usize>,
}

/// Platform config directory path: `<config_dir>/scholar-agent/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("scholar-agent").join("config.toml"))
}

/// Load config by cascading CWD `.scholar-agent.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".scholar-agent.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Field-wise `overlay.or(base)` for one optional section.
fn pick<S, T>(base: &Option<S>, overlay: &Option<S>, field: impl Fn(&S) -> Option<T>) -> Option<T> {
    overlay
        .as_ref()
        .and_then(&field)
        .or_else(|| base.as_ref().and_then(&field))
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        api_keys: Some(ApiKeysConfig {
            llm_api_key: pick(&base.api_keys, &overlay.api_keys, |a| a.llm_api_key.clone()),
            search_api_key: pick(&base.api_keys, &overlay.api_keys, |a| a.search_api_key.clone()),
            parse_api_key: pick(&base.api_keys, &overlay.api_keys, |a| a.parse_api_key.clone()),
        }),
        llm: Some(LlmConfig {
            base_url: pick(&base.llm, &overlay.llm, |l| l.base_url.clone()),
            model: pick(&base.llm, &overlay.llm, |l| l.model.clone()),
            report_language: pick(&base.llm, &overlay.llm, |l| l.report_language.clone()),
            temperature: pick(&base.llm, &overlay.llm, |l| l.temperature),
        }),
        search: Some(SearchConfig {
            base_url: pick(&base.search, &overlay.search, |s| s.base_url.clone()),
            max_results: pick(&base.search, &overlay.search, |s| s.max_results),
            depth: pick(&base.search, &overlay.search, |s| s.depth.clone()),
        }),
        parsing: Some(ParsingConfig {
            base_url: pick(&base.parsing, &overlay.parsing, |p| p.base_url.clone()),
            language: pick(&base.parsing, &overlay.parsing, |p| p.language.clone()),
            poll_interval_secs: pick(&base.parsing, &overlay.parsing, |p| p.poll_interval_secs),
            max_wait_secs: pick(&base.parsing, &overlay.parsing, |p| p.max_wait_secs),
        }),
        server: Some(ServerConfig {
            bind: pick(&base.server, &overlay.server, |s| s.bind.clone()),
            max_upload_mb: pick(&base.server, &overlay.server, |s| s.max_upload_mb),
        }),
    }
}
