use std::sync::Arc;

use crate::llm_client::LlmClient;
use crate::recommendation::Recommender;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    /// Catalog, semantic matcher and narrative generator behind one handle.
    pub recommender: Arc<Recommender>,
    /// Used directly by resume extraction.
    pub llm: LlmClient,
}
