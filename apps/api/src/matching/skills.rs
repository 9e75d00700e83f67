//! Competency score: exact Jaccard overlap blended with semantic best-match similarity.

use std::collections::HashSet;

use tracing::trace;

use crate::matching::attributes::normalized_set;
use crate::matching::semantic::SemanticMatcher;

const EXACT_WEIGHT: f64 = 0.4;
const SEMANTIC_WEIGHT: f64 = 0.6;

/// Jaccard index. Two empty sets are identical (1.0); one empty set shares nothing (0.0).
pub fn jaccard<T: Eq + std::hash::Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

pub struct SkillScorer<'m> {
    matcher: &'m SemanticMatcher,
}

impl<'m> SkillScorer<'m> {
    pub fn new(matcher: &'m SemanticMatcher) -> Self {
        Self { matcher }
    }

    /// Scores `candidate_skills` against `job_skills` in [0, 100].
    ///
    /// An empty requirement list or an empty candidate list scores 0.
    pub fn score(&self, candidate_skills: &[String], job_skills: &[String]) -> f64 {
        if job_skills.is_empty() || candidate_skills.is_empty() {
            return 0.0;
        }

        let exact = jaccard(&normalized_set(candidate_skills), &normalized_set(job_skills));
        let similarity = self.matcher.similarity(candidate_skills, job_skills);
        if !similarity.is_available() {
            trace!("Skill similarity unavailable, exact overlap only");
        }
        let semantic = f64::from(similarity.value().max(0.0));

        let competency = EXACT_WEIGHT * exact + SEMANTIC_WEIGHT * semantic;
        (competency * 100.0).clamp(0.0, 100.0)
    }
}
