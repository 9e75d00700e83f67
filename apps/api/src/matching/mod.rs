//! Matching: per-job raw scores for the five dimensions.
//!
//! Scorers are plain functions over a shared, read-only `SemanticMatcher`;
//! nothing here holds per-call mutable state, so jobs can be scored in any
//! order or in parallel.

pub mod annotate;
pub mod attributes;
pub mod embedder;
pub mod semantic;
pub mod skills;

use std::collections::HashSet;

use serde::Serialize;

use crate::matching::attributes::{
    normalize, normalized_set, score_salary, score_set_overlap, score_title,
};
use crate::matching::semantic::SemanticMatcher;
use crate::matching::skills::SkillScorer;
use crate::models::{CandidatePreferences, Dimension, JobRecord};

/// Unweighted per-dimension scores in [0, 100] for one job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RawScores {
    pub skills: f64,
    pub title: f64,
    pub location: f64,
    pub industry: f64,
    pub salary: f64,
}

impl RawScores {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Skills => self.skills,
            Dimension::Title => self.title,
            Dimension::Location => self.location,
            Dimension::Industry => self.industry,
            Dimension::Salary => self.salary,
        }
    }
}

/// A non-finite or out-of-range score from any scorer counts as 0 on that
/// dimension instead of poisoning the aggregate.
fn sanitize(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Preferences normalized once per call.
pub struct PreparedPreferences<'p> {
    pub raw: &'p CandidatePreferences,
    locations: HashSet<String>,
    industries: HashSet<String>,
}

impl<'p> PreparedPreferences<'p> {
    pub fn new(raw: &'p CandidatePreferences) -> Self {
        Self {
            raw,
            locations: normalized_set(&raw.locations),
            industries: normalized_set(&raw.industries),
        }
    }

    pub fn has_location_preference(&self) -> bool {
        !self.locations.is_empty()
    }
}

pub fn score_job(
    matcher: &SemanticMatcher,
    prefs: &PreparedPreferences<'_>,
    job: &JobRecord,
) -> RawScores {
    let skills = SkillScorer::new(matcher).score(&prefs.raw.skills, &job.required_skills);
    let title = score_title(matcher, &job.title, &prefs.raw.titles);
    let location = score_set_overlap(
        &prefs.locations,
        &HashSet::from([normalize(&job.location)]),
    );
    let industry = score_set_overlap(
        &prefs.industries,
        &HashSet::from([normalize(&job.industry)]),
    );
    let salary = score_salary(prefs.raw.min_salary, job.salary_range);

    RawScores {
        skills: sanitize(skills),
        title: sanitize(title),
        location: sanitize(location),
        industry: sanitize(industry),
        salary: sanitize(salary),
    }
}
