use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use scholar_core::{Config, OpenAiCompatible, ReportSynthesizer, Tavily, config_file};
use scholar_ingest::LlamaParse;

mod handlers;
mod models;
mod session;
mod state;
mod template;
mod upload;


use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::resolve(&config_file::load_config(), |key| std::env::var(key).ok())?;
    tracing::info!(?config, "configuration loaded");

    let parser = LlamaParse::new(config.parse_api_key.clone())
        .with_base_url(config.parse_base_url.clone())
        .with_language(config.parse_language.clone())
        .with_polling(
            Duration::from_secs(config.parse_poll_interval_secs),
            Duration::from_secs(config.parse_max_wait_secs),
        );
    let chat = OpenAiCompatible::new(
        config.llm_api_key.clone(),
        config.llm_base_url.clone(),
        config.llm_model.clone(),
    );
    let search = Tavily::new(config.search_api_key.clone())
        .with_base_url(config.search_base_url.clone())
        .with_max_results(config.search_max_results)
        .with_search_depth(config.search_depth.clone());
    let synthesizer = ReportSynthesizer::new(Arc::new(chat), Arc::new(search))
        .with_language(config.report_language.clone())
        .with_temperature(config.report_temperature);

    let state = Arc::new(AppState::new(Arc::new(parser), Arc::new(synthesizer)));
    let app = router(state, config.max_upload_mb * 1024 * 1024).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn router(state: Arc<AppState>, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(handlers::index::index))
        .route("/analyze/stream", post(handlers::stream::stream))
        .route("/report", get(handlers::report::current))
        .route("/report/download", get(handlers::report::download))
        .route("/session/reset", post(handlers::report::reset))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
