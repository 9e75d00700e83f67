//! Semantic similarity over an injected embedding model.
//!
//! The model is loaded lazily, exactly once, and shared read-only by every
//! scorer. A failed load leaves the matcher in `ModelStatus::Degraded`, where
//! every comparison reports `Similarity::Unavailable` and scores collapse to 0.

use std::sync::OnceLock;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};

use crate::matching::embedder::{cosine_similarity, Embedder};

type Loader = Box<dyn Fn() -> Result<Box<dyn Embedder>> + Send + Sync>;

/// Outcome of a similarity query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Similarity {
    /// Raw cosine-derived score. Usually in [0, 1], may dip below 0.
    Score(f32),
    /// The model is unavailable or the embedding call failed.
    Unavailable,
}

impl Similarity {
    /// Degraded results read as 0.
    pub fn value(self) -> f32 {
        match self {
            Similarity::Score(v) => v,
            Similarity::Unavailable => 0.0,
        }
    }

    pub fn is_available(self) -> bool {
        matches!(self, Similarity::Score(_))
    }
}

pub enum ModelStatus {
    Ready(Box<dyn Embedder>),
    Degraded { reason: String },
}

/// Snapshot of the model state for health output.
#[derive(Debug, Clone, Serialize)]
pub struct ModelReport {
    pub status: &'static str,
    pub backend: Option<&'static str>,
    pub reason: Option<String>,
}

/// One side of a comparison: a single text or an ordered list of texts.
#[derive(Debug, Clone, Copy)]
pub enum Texts<'a> {
    One(&'a str),
    Many(&'a [String]),
}

impl<'a> Texts<'a> {
    fn is_empty(&self) -> bool {
        match self {
            Texts::One(s) => s.is_empty(),
            Texts::Many(items) => items.is_empty(),
        }
    }

    fn as_vec(&self) -> Vec<&'a str> {
        match self {
            Texts::One(s) => vec![*s],
            Texts::Many(items) => items.iter().map(String::as_str).collect(),
        }
    }
}

impl<'a> From<&'a str> for Texts<'a> {
    fn from(s: &'a str) -> Self {
        Texts::One(s)
    }
}

impl<'a> From<&'a String> for Texts<'a> {
    fn from(s: &'a String) -> Self {
        Texts::One(s.as_str())
    }
}

impl<'a> From<&'a [String]> for Texts<'a> {
    fn from(items: &'a [String]) -> Self {
        Texts::Many(items)
    }
}

impl<'a> From<&'a Vec<String>> for Texts<'a> {
    fn from(items: &'a Vec<String>) -> Self {
        Texts::Many(items.as_slice())
    }
}

pub struct SemanticMatcher {
    loader: Loader,
    state: OnceLock<ModelStatus>,
}

impl SemanticMatcher {
    /// Defers model loading until first use or `warm_up`.
    pub fn lazy<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Box<dyn Embedder>> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            state: OnceLock::new(),
        }
    }

    /// Wraps an already-constructed embedder.
    #[cfg(test)]
    pub fn ready(embedder: Box<dyn Embedder>) -> Self {
        let state = OnceLock::new();
        let _ = state.set(ModelStatus::Ready(embedder));
        Self {
            loader: Box::new(|| -> Result<Box<dyn Embedder>> {
                anyhow::bail!("embedder already initialised")
            }),
            state,
        }
    }

    /// A matcher that never loads a model.
    pub fn disabled(reason: impl Into<String>) -> Self {
        let state = OnceLock::new();
        let _ = state.set(ModelStatus::Degraded {
            reason: reason.into(),
        });
        Self {
            loader: Box::new(|| -> Result<Box<dyn Embedder>> {
                anyhow::bail!("semantic matching disabled")
            }),
            state,
        }
    }

    /// Runs the loader if it has not run yet. Concurrent callers block until
    /// the single load completes.
    pub fn warm_up(&self) -> &ModelStatus {
        self.state.get_or_init(|| match (self.loader)() {
            Ok(embedder) => {
                info!(backend = embedder.name(), "Semantic model loaded");
                ModelStatus::Ready(embedder)
            }
            Err(e) => {
                warn!("Semantic model failed to load, running degraded: {e:#}");
                ModelStatus::Degraded {
                    reason: e.to_string(),
                }
            }
        })
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.warm_up(), ModelStatus::Degraded { .. })
    }

    /// Current state without triggering or waiting on a load. `None` while the
    /// loader has not finished.
    pub fn status(&self) -> Option<&ModelStatus> {
        self.state.get()
    }

    /// Health snapshot. Never blocks; reports `loading` until the loader is done.
    pub fn report(&self) -> ModelReport {
        match self.status() {
            None => ModelReport {
                status: "loading",
                backend: None,
                reason: None,
            },
            Some(ModelStatus::Ready(embedder)) => ModelReport {
                status: "ready",
                backend: Some(embedder.name()),
                reason: None,
            },
            Some(ModelStatus::Degraded { reason }) => ModelReport {
                status: "degraded",
                backend: None,
                reason: Some(reason.clone()),
            },
        }
    }

    /// Compares `a` against `b`.
    ///
    /// - single vs single: cosine of the two embeddings
    /// - single vs list: best cosine over the list
    /// - list vs anything: for each item of `a`, its best cosine against `b`,
    ///   averaged over `a` (asymmetric best match per `a` item)
    ///
    /// Empty input scores `Score(0.0)`.
    pub fn similarity<'a, 'b>(
        &self,
        a: impl Into<Texts<'a>>,
        b: impl Into<Texts<'b>>,
    ) -> Similarity {
        let (a, b) = (a.into(), b.into());

        let embedder = match self.warm_up() {
            ModelStatus::Ready(embedder) => embedder,
            ModelStatus::Degraded { .. } => return Similarity::Unavailable,
        };

        if a.is_empty() || b.is_empty() {
            return Similarity::Score(0.0);
        }

        let left = a.as_vec();
        let right = b.as_vec();
        let mut batch = left.clone();
        batch.extend_from_slice(&right);

        let vectors = match embedder.embed(&batch) {
            Ok(v) if v.len() == batch.len() => v,
            Ok(v) => {
                warn!(
                    expected = batch.len(),
                    got = v.len(),
                    "Embedder returned wrong number of vectors"
                );
                return Similarity::Unavailable;
            }
            Err(e) => {
                warn!("Embedding failed: {e:#}");
                return Similarity::Unavailable;
            }
        };
        let (left_vecs, right_vecs) = vectors.split_at(left.len());

        let best_match = |v: &[f32]| {
            right_vecs
                .iter()
                .map(|r| cosine_similarity(v, r))
                .fold(f32::NEG_INFINITY, f32::max)
        };

        let score = match a {
            Texts::One(_) => best_match(left_vecs[0].as_slice()),
            Texts::Many(_) => {
                let total: f32 = left_vecs.iter().map(|v| best_match(v.as_slice())).sum();
                total / left_vecs.len() as f32
            }
        };

        if score.is_finite() {
            Similarity::Score(score)
        } else {
            Similarity::Unavailable
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;

    use super::*;

    /// Embedder with hand-placed unit vectors. Unknown texts embed to a vector
    /// orthogonal to every known one.
    pub struct TableEmbedder {
        table: HashMap<String, Vec<f32>>,
        dimension: usize,
    }

    impl TableEmbedder {
        pub fn new(entries: &[(&str, Vec<f32>)]) -> Self {
            let dimension = entries.first().map(|(_, v)| v.len()).unwrap_or(1) + 1;
            let table = entries
                .iter()
                .map(|(k, v)| {
                    let mut padded = v.clone();
                    padded.push(0.0);
                    (k.to_string(), padded)
                })
                .collect();
            Self { table, dimension }
        }
    }

    impl Embedder for TableEmbedder {
        fn name(&self) -> &'static str {
            "table"
        }

        fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|t| {
                    self.table.get(*t).cloned().unwrap_or_else(|| {
                        let mut v = vec![0.0; self.dimension];
                        v[self.dimension - 1] = 1.0;
                        v
                    })
                })
                .collect())
        }
    }

    pub struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn embed(&self, _texts: &[&str]) -> Result<Vec<Vec<f32>>> {
            anyhow::bail!("inference backend crashed")
        }
    }

    pub fn matcher(entries: &[(&str, Vec<f32>)]) -> SemanticMatcher {
        SemanticMatcher::ready(Box::new(TableEmbedder::new(entries)))
    }
}
