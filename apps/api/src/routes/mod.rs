pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::recommendation::handlers::handle_recommend;
use crate::resume::handlers::handle_parse_resume;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/recommend", post(handle_recommend))
        .route("/parse_resume", post(handle_parse_resume))
        .with_state(state)
}
