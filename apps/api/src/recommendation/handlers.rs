//! Axum route handlers for the Recommendation API.

use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::RecommendRequest;
use crate::recommendation::RecommendationResult;
use crate::state::AppState;

/// POST /recommend
///
/// Scores the catalog against the candidate's preferences and returns up to
/// five ranked matches with breakdowns, match details and a story each.
pub async fn handle_recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<Vec<RecommendationResult>>, AppError> {
    request.weights.validate()?;

    let request_id = Uuid::new_v4();
    let span = info_span!("recommend", %request_id);

    async move {
        let RecommendRequest {
            preferences,
            weights,
        } = request;

        // Scoring is CPU-bound (embeddings); keep it off the async workers
        let recommender = Arc::clone(&state.recommender);
        let scoring_span = tracing::Span::current();
        let (preferences, ranked) = tokio::task::spawn_blocking(move || {
            let _guard = scoring_span.enter();
            let ranked = recommender.rank(&preferences, &weights);
            (preferences, ranked)
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("scoring task failed: {e}")))?;

        let results = state.recommender.narrate(&preferences, ranked).await;
        info!(results = results.len(), "Recommendations ready");
        Ok(Json(results))
    }
    .instrument(span)
    .await
}
