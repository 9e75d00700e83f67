mod catalog;
mod config;
mod errors;
mod llm_client;
mod matching;
mod models;
mod recommendation;
mod resume;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::{Config, EmbeddingBackend};
use crate::llm_client::LlmClient;
use crate::matching::embedder::{Embedder, HashEmbedder};
use crate::matching::semantic::SemanticMatcher;
use crate::recommendation::narrative::{
    FallbackNarrativeGenerator, LlmNarrativeGenerator, NarrativeGenerator,
};
use crate::recommendation::Recommender;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; only malformed values are fatal
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Recommender API v{}", env!("CARGO_PKG_VERSION"));

    // Job catalog; a missing or unreadable file leaves the service running with no jobs
    let catalog = Arc::new(Catalog::load_or_empty(&config.jobs_csv_path));
    if catalog.is_empty() {
        warn!("Job catalog is empty; /recommend will return no results");
    } else {
        info!("Job catalog ready ({} jobs)", catalog.len());
    }

    // Semantic matcher: loaded once, in the background, before first use
    let matcher = Arc::new(build_matcher(config.embedding_backend));
    {
        let matcher = Arc::clone(&matcher);
        tokio::task::spawn_blocking(move || {
            if matcher.is_degraded() {
                warn!("Semantic matching unavailable; skill and title scores use exact matches only");
            }
        });
    }

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    let narrator: Arc<dyn NarrativeGenerator> = if llm.is_configured() {
        info!("LLM client initialized (model: {})", llm_client::MODEL);
        Arc::new(LlmNarrativeGenerator(llm.clone()))
    } else {
        warn!("ANTHROPIC_API_KEY not set: stories use the fallback template, resume parsing is disabled");
        Arc::new(FallbackNarrativeGenerator)
    };

    let recommender = Recommender::new(catalog, matcher, narrator)
        .with_narrative_timeout(config.narrative_timeout);

    // Build app state
    let state = AppState {
        recommender: Arc::new(recommender),
        llm,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs the semantic matcher for the configured embedding backend.
fn build_matcher(backend: EmbeddingBackend) -> SemanticMatcher {
    match backend {
        EmbeddingBackend::MiniLm => SemanticMatcher::lazy(load_minilm),
        EmbeddingBackend::Hash => SemanticMatcher::lazy(|| -> Result<Box<dyn Embedder>> {
            Ok(Box::new(HashEmbedder::default()))
        }),
        EmbeddingBackend::Disabled => {
            warn!("Semantic matching disabled by configuration");
            SemanticMatcher::disabled("disabled by EMBEDDING_BACKEND")
        }
    }
}

#[cfg(feature = "minilm")]
fn load_minilm() -> Result<Box<dyn Embedder>> {
    Ok(Box::new(crate::matching::embedder::MiniLmEmbedder::load()?))
}

#[cfg(not(feature = "minilm"))]
fn load_minilm() -> Result<Box<dyn Embedder>> {
    anyhow::bail!("built without the `minilm` feature")
}
