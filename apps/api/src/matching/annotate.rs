//! Match-detail annotations: why each job attribute value did or did not match.

use serde::{Deserialize, Serialize};

use crate::matching::attributes::{normalize, normalized_set};
use crate::matching::semantic::SemanticMatcher;

pub const SKILLS_SEMANTIC_THRESHOLD: f32 = 0.5;
pub const TITLE_SEMANTIC_THRESHOLD: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Direct,
    Semantic,
    None,
}

/// One job attribute value and how it matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetail {
    #[serde(rename = "skill")]
    pub value: String,
    #[serde(rename = "type")]
    pub kind: MatchKind,
}

/// Classifies each of `job_values` against the raw `preferences`.
///
/// `semantic_threshold` is `Some` only for dimensions that allow semantic
/// matches (skills, title); the similarity must strictly exceed it.
pub fn annotate(
    matcher: &SemanticMatcher,
    preferences: &[String],
    job_values: &[String],
    semantic_threshold: Option<f32>,
) -> Vec<MatchDetail> {
    if preferences.is_empty() {
        return job_values
            .iter()
            .map(|v| MatchDetail {
                value: v.clone(),
                kind: MatchKind::None,
            })
            .collect();
    }

    let normalized_prefs = normalized_set(preferences);

    job_values
        .iter()
        .map(|value| {
            let kind = if normalized_prefs.contains(&normalize(value)) {
                MatchKind::Direct
            } else if semantic_threshold.is_some_and(|threshold| {
                matcher.similarity(value, preferences).value() > threshold
            }) {
                MatchKind::Semantic
            } else {
                MatchKind::None
            };
            MatchDetail {
                value: value.clone(),
                kind,
            }
        })
        .collect()
}
