use std::sync::Arc;

use scholar_core::ReportSynthesizer;
use scholar_ingest::DocumentParser;

use crate::session::SessionStore;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub parser: Arc<dyn DocumentParser>,
    pub synthesizer: Arc<ReportSynthesizer>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(parser: Arc<dyn DocumentParser>, synthesizer: Arc<ReportSynthesizer>) -> Self {
        Self {
            parser,
            synthesizer,
            sessions: SessionStore::default(),
        }
    }
}
