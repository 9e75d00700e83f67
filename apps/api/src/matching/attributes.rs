//! Per-attribute scorers for title, location, industry and salary. Each returns a raw score in [0, 100].

use std::collections::HashSet;

use crate::matching::semantic::SemanticMatcher;
use crate::models::SalaryRange;

pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

pub fn normalized_set(values: &[String]) -> HashSet<String> {
    values.iter().map(|v| normalize(v)).collect()
}

/// Title relevance: best semantic match of the job title against the preferred titles.
pub fn score_title(matcher: &SemanticMatcher, job_title: &str, preferred_titles: &[String]) -> f64 {
    let sim = matcher.similarity(job_title, preferred_titles).value().max(0.0);
    (f64::from(sim) * 100.0).min(100.0)
}

/// Set-overlap score used for location and industry.
///
/// No preference means full credit. Otherwise `100 * |prefs ∩ job| / |prefs ∪ job|`.
pub fn score_set_overlap(preferences: &HashSet<String>, job_values: &HashSet<String>) -> f64 {
    if preferences.is_empty() {
        return 100.0;
    }
    let intersection = preferences.intersection(job_values).count();
    let union = preferences.union(job_values).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64 * 100.0
    }
}

/// Single hard threshold on the top of the posted band.
pub fn score_salary(min_salary: Option<u64>, range: SalaryRange) -> f64 {
    match min_salary {
        None | Some(0) => 100.0,
        Some(min) if range.max() >= min => 100.0,
        Some(_) => 0.0,
    }
}
