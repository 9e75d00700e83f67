use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Which embedding model backs semantic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// all-MiniLM-L6-v2 (requires the `minilm` feature)
    MiniLm,
    /// Feature-hashing embedder, no model files
    Hash,
    /// Semantic matching off; engine runs degraded
    Disabled,
}

impl Default for EmbeddingBackend {
    fn default() -> Self {
        if cfg!(feature = "minilm") {
            EmbeddingBackend::MiniLm
        } else {
            EmbeddingBackend::Hash
        }
    }
}

impl FromStr for EmbeddingBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "minilm" => Ok(EmbeddingBackend::MiniLm),
            "hash" => Ok(EmbeddingBackend::Hash),
            "none" | "off" | "disabled" => Ok(EmbeddingBackend::Disabled),
            other => bail!("unknown embedding backend '{other}' (expected minilm, hash or none)"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Only malformed values are fatal; missing optional services run degraded.
#[derive(Debug, Clone)]
pub struct Config {
    pub jobs_csv_path: String,
    /// Absent ⇒ narratives use the fallback story and resume parsing is unavailable.
    pub anthropic_api_key: Option<String>,
    pub embedding_backend: EmbeddingBackend,
    pub narrative_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            jobs_csv_path: std::env::var("JOBS_CSV_PATH")
                .unwrap_or_else(|_| "data/jobs.csv".to_string()),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            embedding_backend: match std::env::var("EMBEDDING_BACKEND") {
                Ok(v) => v.parse().context("EMBEDDING_BACKEND is invalid")?,
                Err(_) => EmbeddingBackend::default(),
            },
            narrative_timeout: Duration::from_secs(
                std::env::var("NARRATIVE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse::<u64>()
                    .context("NARRATIVE_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}
