use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Reports service version, catalog size and whether semantic matching is degraded.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "recommender-api",
        "catalog_size": state.recommender.catalog().len(),
        "semantic_model": state.recommender.matcher().report(),
        "narratives": if state.llm.is_configured() { "llm" } else { "fallback" },
    }))
}
