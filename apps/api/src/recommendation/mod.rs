//! Recommendation: ranks the catalog against one candidate's preferences.
//!
//! Flow per call:
//! 1. score every job on the five dimensions (`matching::score_job`)
//! 2. drop jobs outside the preferred locations
//! 3. weighted aggregate with residual correction (`breakdown::aggregate`)
//! 4. keep `match_score > MIN_MATCH_SCORE`, attach match details
//! 5. stable sort by score, keep the top `MAX_RESULTS`
//! 6. narratives for those results only, concurrently, each under a timeout
//!
//! Steps 1–5 are synchronous and CPU-bound (`rank`); step 6 is async (`narrate`).

pub mod breakdown;
pub mod handlers;
pub mod narrative;
pub mod prompts;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::matching::annotate::{
    annotate, MatchDetail, SKILLS_SEMANTIC_THRESHOLD, TITLE_SEMANTIC_THRESHOLD,
};
use crate::matching::semantic::SemanticMatcher;
use crate::matching::{score_job, PreparedPreferences};
use crate::models::{CandidatePreferences, JobRecord, SalaryRange, WeightVector};
use crate::recommendation::breakdown::{aggregate, Breakdown};
use crate::recommendation::narrative::{fallback_story, Narrative, NarrativeGenerator};

pub const MAX_RESULTS: usize = 5;
/// Results must score strictly above this.
pub const MIN_MATCH_SCORE: i64 = 40;
pub const DEFAULT_NARRATIVE_TIMEOUT: Duration = Duration::from_secs(10);

/// UI explanations per dimension. Salary is a display string, not a match list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationDetails {
    #[serde(rename = "Skills")]
    pub skills: Vec<MatchDetail>,
    #[serde(rename = "Title")]
    pub title: Vec<MatchDetail>,
    #[serde(rename = "Location")]
    pub location: Vec<MatchDetail>,
    #[serde(rename = "Industry")]
    pub industry: Vec<MatchDetail>,
    #[serde(rename = "Salary")]
    pub salary: String,
}

/// A kept, ranked job before narrative enrichment.
#[derive(Debug, Clone)]
pub struct RankedMatch {
    pub job: Arc<JobRecord>,
    pub match_score: i64,
    pub breakdown: Breakdown,
    pub validation_details: ValidationDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResult {
    pub job_id: String,
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub match_score: i64,
    pub breakdown: Breakdown,
    pub validation_details: ValidationDetails,
    pub story: String,
}

impl RecommendationResult {
    fn from_ranked(ranked: RankedMatch, story: String) -> Self {
        let RankedMatch {
            job,
            match_score,
            breakdown,
            validation_details,
        } = ranked;
        Self {
            job_id: job.id.clone(),
            job_title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            match_score,
            breakdown,
            validation_details,
            story,
        }
    }
}

/// Rupee amount with Indian digit grouping: 1300000 -> "₹13,00,000".
pub fn format_rupees(amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return format!("₹{digits}");
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();
    format!("₹{},{tail}", groups.join(","))
}

pub fn format_salary_range(range: SalaryRange) -> String {
    format!(
        "{} - {}",
        format_rupees(range.min()),
        format_rupees(range.max())
    )
}

fn validation_details(
    matcher: &SemanticMatcher,
    prefs: &CandidatePreferences,
    job: &JobRecord,
) -> ValidationDetails {
    ValidationDetails {
        skills: annotate(
            matcher,
            &prefs.skills,
            &job.required_skills,
            Some(SKILLS_SEMANTIC_THRESHOLD),
        ),
        title: annotate(
            matcher,
            &prefs.titles,
            std::slice::from_ref(&job.title),
            Some(TITLE_SEMANTIC_THRESHOLD),
        ),
        location: annotate(
            matcher,
            &prefs.locations,
            std::slice::from_ref(&job.location),
            None,
        ),
        industry: annotate(
            matcher,
            &prefs.industries,
            std::slice::from_ref(&job.industry),
            None,
        ),
        salary: format_salary_range(job.salary_range),
    }
}

pub struct Recommender {
    catalog: Arc<Catalog>,
    matcher: Arc<SemanticMatcher>,
    narrator: Arc<dyn NarrativeGenerator>,
    narrative_timeout: Duration,
}

impl Recommender {
    pub fn new(
        catalog: Arc<Catalog>,
        matcher: Arc<SemanticMatcher>,
        narrator: Arc<dyn NarrativeGenerator>,
    ) -> Self {
        Self {
            catalog,
            matcher,
            narrator,
            narrative_timeout: DEFAULT_NARRATIVE_TIMEOUT,
        }
    }

    pub fn with_narrative_timeout(mut self, timeout: Duration) -> Self {
        self.narrative_timeout = timeout;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn matcher(&self) -> &SemanticMatcher {
        &self.matcher
    }

    /// Scores, filters, ranks and truncates the catalog. No narratives.
    pub fn rank(&self, prefs: &CandidatePreferences, weights: &WeightVector) -> Vec<RankedMatch> {
        if weights.total() <= 0.0 {
            debug!("All weights are zero; nothing to aggregate");
            return Vec::new();
        }

        let prepared = PreparedPreferences::new(prefs);
        let mut kept = Vec::new();

        for job in self.catalog.jobs() {
            // A panicking scorer or embedder drops only the job that triggered it
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                self.evaluate(&prepared, prefs, weights, job)
            }));
            match outcome {
                Ok(Some(ranked)) => kept.push(ranked),
                Ok(None) => {}
                Err(_) => warn!(job_id = %job.id, "Scoring panicked, skipping job"),
            }
        }

        let candidates = kept.len();
        // sort_by is stable: equal scores keep catalog order
        kept.sort_by(|a, b| b.match_score.cmp(&a.match_score));
        kept.truncate(MAX_RESULTS);

        info!(
            catalog = self.catalog.len(),
            candidates,
            returned = kept.len(),
            "Catalog ranked"
        );
        kept
    }

    /// Scores one job. `None` when it is filtered out or falls below the threshold.
    fn evaluate(
        &self,
        prepared: &PreparedPreferences<'_>,
        prefs: &CandidatePreferences,
        weights: &WeightVector,
        job: &Arc<JobRecord>,
    ) -> Option<RankedMatch> {
        let raw = score_job(&self.matcher, prepared, job);

        if prepared.has_location_preference() && raw.location == 0.0 {
            debug!(job_id = %job.id, location = %job.location, "Filtered by location");
            return None;
        }

        let weighted = aggregate(&raw, weights)?;

        if weighted.match_score <= MIN_MATCH_SCORE {
            debug!(
                job_id = %job.id,
                score = weighted.match_score,
                final_score = weighted.final_score,
                "Below threshold"
            );
            return None;
        }

        Some(RankedMatch {
            job: Arc::clone(job),
            match_score: weighted.match_score,
            breakdown: weighted.breakdown,
            validation_details: validation_details(&self.matcher, prefs, job),
        })
    }

    /// Attaches a story to each ranked match. Narratives run concurrently;
    /// a slow generator falls back after `narrative_timeout`.
    pub async fn narrate(
        &self,
        prefs: &CandidatePreferences,
        ranked: Vec<RankedMatch>,
    ) -> Vec<RecommendationResult> {
        let narratives = join_all(ranked.iter().map(|m| self.story_for(prefs, &m.job))).await;

        let fallbacks = narratives.iter().filter(|n| n.is_fallback()).count();
        if fallbacks > 0 {
            debug!(fallbacks, total = narratives.len(), "Some stories used the fallback");
        }

        ranked
            .into_iter()
            .zip(narratives)
            .map(|(m, narrative)| RecommendationResult::from_ranked(m, narrative.into_text()))
            .collect()
    }

    async fn story_for(&self, prefs: &CandidatePreferences, job: &JobRecord) -> Narrative {
        match tokio::time::timeout(self.narrative_timeout, self.narrator.generate(prefs, job)).await
        {
            Ok(narrative) => narrative,
            Err(_) => {
                warn!(job_id = %job.id, "Narrative timed out, using fallback");
                Narrative::Fallback(fallback_story(job))
            }
        }
    }

    /// `rank` followed by `narrate` on the current task.
    #[allow(dead_code)]
    pub async fn recommend(
        &self,
        prefs: &CandidatePreferences,
        weights: &WeightVector,
    ) -> Vec<RecommendationResult> {
        let ranked = self.rank(prefs, weights);
        self.narrate(prefs, ranked).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::matching::annotate::MatchKind;
    use crate::matching::embedder::{Embedder, HashEmbedder};
    use crate::models::Dimension;
    use crate::recommendation::narrative::FallbackNarrativeGenerator;

    fn job(id: &str, title: &str, location: &str, skills: &[&str], salary: [u64; 2]) -> JobRecord {
        JobRecord {
            id: id.to_string(),
            title: title.to_string(),
            company: "Acme".to_string(),
            location: location.to_string(),
            industry: "FinTech".to_string(),
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
            salary_range: SalaryRange::from(salary),
            ..Default::default()
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn degraded_recommender(jobs: Vec<JobRecord>) -> Recommender {
        Recommender::new(
            Arc::new(Catalog::from_jobs(jobs)),
            Arc::new(SemanticMatcher::disabled("test")),
            Arc::new(FallbackNarrativeGenerator),
        )
    }

    fn weights(skills: f64, title: f64, location: f64, industry: f64, salary: f64) -> WeightVector {
        WeightVector {
            skills,
            title,
            location,
            industry,
            salary,
        }
    }

    struct CountingNarrator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl NarrativeGenerator for CountingNarrator {
        async fn generate(&self, _prefs: &CandidatePreferences, job: &JobRecord) -> Narrative {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Narrative::Generated(format!("Story for {}", job.id))
        }
    }

    struct StalledNarrator;

    #[async_trait]
    impl NarrativeGenerator for StalledNarrator {
        async fn generate(&self, _prefs: &CandidatePreferences, _job: &JobRecord) -> Narrative {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Narrative::Generated("too late".to_string())
        }
    }

    #[test]
    fn test_format_rupees_indian_grouping() {
        assert_eq!(format_rupees(0), "₹0");
        assert_eq!(format_rupees(999), "₹999");
        assert_eq!(format_rupees(1_000), "₹1,000");
        assert_eq!(format_rupees(900_000), "₹9,00,000");
        assert_eq!(format_rupees(1_300_000), "₹13,00,000");
        assert_eq!(format_rupees(123_456_789), "₹12,34,56,789");
    }

    #[test]
    fn test_format_salary_range() {
        assert_eq!(
            format_salary_range(SalaryRange::new(900_000, 1_300_000)),
            "₹9,00,000 - ₹13,00,000"
        );
    }

    #[tokio::test]
    async fn test_single_job_example_in_degraded_mode() {
        let recommender = degraded_recommender(vec![job(
            "INFY-0",
            "Backend Developer",
            "Pune",
            &["Java", "SQL"],
            [900_000, 1_300_000],
        )]);
        let prefs = CandidatePreferences {
            skills: strings(&["java", "sql"]),
            locations: strings(&["Pune"]),
            min_salary: Some(800_000),
            ..Default::default()
        };

        let results = recommender
            .recommend(&prefs, &weights(1.0, 0.0, 1.0, 0.0, 1.0))
            .await;

        assert_eq!(results.len(), 1);
        let r = &results[0];
        // (40 + 100 + 100) / 3 = 80
        assert_eq!(r.match_score, 80);
        assert_eq!(r.breakdown.total(), r.match_score);
        assert_eq!(r.breakdown.get(Dimension::Skills), 13);
        assert_eq!(r.breakdown.get(Dimension::Title), 0);
        assert_eq!(r.breakdown.get(Dimension::Industry), 0);
        assert_eq!(
            r.breakdown.get(Dimension::Location) + r.breakdown.get(Dimension::Salary),
            67
        );
        assert_eq!(r.validation_details.salary, "₹9,00,000 - ₹13,00,000");
        assert_eq!(r.validation_details.location[0].kind, MatchKind::Direct);
        assert!(r
            .validation_details
            .skills
            .iter()
            .all(|d| d.kind == MatchKind::Direct));
        assert_eq!(r.story, "This role aligns well with your skills in Java, SQL.");
    }

    #[tokio::test]
    async fn test_location_preference_filters_non_matching_jobs() {
        let recommender = degraded_recommender(vec![
            job("A", "Dev", "Mumbai", &["Java"], [0, 2_000_000]),
            job("B", "Dev", "pune ", &["Java"], [0, 2_000_000]),
        ]);
        let prefs = CandidatePreferences {
            skills: strings(&["Java"]),
            locations: strings(&["Pune"]),
            ..Default::default()
        };
        // Salary alone would carry job A above the threshold without the filter
        let results = recommender
            .recommend(&prefs, &weights(0.0, 0.0, 1.0, 0.0, 1.0))
            .await;
        let ids: Vec<_> = results.iter().map(|r| r.job_id.as_str()).collect();
        assert_eq!(ids, vec!["B"]);
    }

    #[tokio::test]
    async fn test_zero_weights_yield_no_results() {
        let recommender = degraded_recommender(vec![job("A", "Dev", "Pune", &["Java"], [0, 1])]);
        let results = recommender
            .recommend(&CandidatePreferences::default(), &WeightVector::default())
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_threshold_is_strictly_above_forty() {
        // skills-only weight: degraded skill score is exactly 40 for a full exact match
        let recommender =
            degraded_recommender(vec![job("A", "Dev", "Pune", &["Java"], [0, 1])]);
        let prefs = CandidatePreferences {
            skills: strings(&["Java"]),
            ..Default::default()
        };
        let results = recommender
            .recommend(&prefs, &weights(1.0, 0.0, 0.0, 0.0, 0.0))
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_top_five_sorted_and_stable() {
        // No preferences: location/industry/salary all score 100.
        // Skills weight dilutes those with 0 for jobs whose skills do not match.
        let jobs = vec![
            job("J0", "Dev", "Pune", &["Go"], [0, 1]),
            job("J1", "Dev", "Pune", &["Java"], [0, 1]),
            job("J2", "Dev", "Pune", &["Go"], [0, 1]),
            job("J3", "Dev", "Pune", &["Go"], [0, 1]),
            job("J4", "Dev", "Pune", &["Java"], [0, 1]),
            job("J5", "Dev", "Pune", &["Go"], [0, 1]),
            job("J6", "Dev", "Pune", &["Go"], [0, 1]),
        ];
        let recommender = degraded_recommender(jobs);
        let prefs = CandidatePreferences {
            skills: strings(&["Java"]),
            ..Default::default()
        };

        let results = recommender
            .recommend(&prefs, &weights(1.0, 0.0, 1.0, 0.0, 0.0))
            .await;

        let ids: Vec<_> = results.iter().map(|r| r.job_id.as_str()).collect();
        // Java jobs: (40 + 100) / 2 = 70; Go jobs: 100 / 2 = 50
        assert_eq!(ids, vec!["J1", "J4", "J0", "J2", "J3"]);
        assert!(results
            .windows(2)
            .all(|w| w[0].match_score >= w[1].match_score));
        for r in &results {
            assert_eq!(r.breakdown.total(), r.match_score);
        }
    }

    #[tokio::test]
    async fn test_narratives_only_for_returned_results() {
        let jobs: Vec<_> = (0..9)
            .map(|i| job(&format!("J{i}"), "Dev", "Pune", &["Go"], [0, 1]))
            .collect();
        let narrator = Arc::new(CountingNarrator {
            calls: AtomicUsize::new(0),
        });
        let recommender = Recommender::new(
            Arc::new(Catalog::from_jobs(jobs)),
            Arc::new(SemanticMatcher::disabled("test")),
            narrator.clone(),
        );

        let results = recommender
            .recommend(&CandidatePreferences::default(), &weights(0.0, 0.0, 1.0, 1.0, 1.0))
            .await;

        assert_eq!(results.len(), MAX_RESULTS);
        assert_eq!(narrator.calls.load(Ordering::SeqCst), MAX_RESULTS);
        assert_eq!(results[2].story, "Story for J2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_narrative_falls_back_after_timeout() {
        let recommender = Recommender::new(
            Arc::new(Catalog::from_jobs(vec![job(
                "A",
                "Dev",
                "Pune",
                &["Rust"],
                [0, 1],
            )])),
            Arc::new(SemanticMatcher::disabled("test")),
            Arc::new(StalledNarrator),
        )
        .with_narrative_timeout(Duration::from_millis(50));

        let results = recommender
            .recommend(&CandidatePreferences::default(), &weights(0.0, 0.0, 1.0, 0.0, 0.0))
            .await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].story, "This role aligns well with your skills in Rust.");
    }

    #[tokio::test]
    async fn test_semantic_backend_lifts_related_titles() {
        let recommender = Recommender::new(
            Arc::new(Catalog::from_jobs(vec![
                job("A", "Senior Backend Developer", "Pune", &["Java"], [0, 1]),
                job("B", "Android Developer", "Pune", &["Kotlin"], [0, 1]),
                job("C", "Chartered Accountant", "Pune", &["Tally"], [0, 1]),
            ])),
            Arc::new(SemanticMatcher::ready(Box::new(HashEmbedder::default()))),
            Arc::new(FallbackNarrativeGenerator),
        );
        let prefs = CandidatePreferences {
            titles: strings(&["Backend Developer"]),
            ..Default::default()
        };

        let ranked = recommender.rank(&prefs, &weights(0.0, 1.0, 0.0, 0.0, 0.0));

        assert_eq!(ranked.first().map(|m| m.job.id.as_str()), Some("A"));
        assert!(ranked.iter().all(|m| m.job.id != "C"));
        assert_eq!(
            ranked[0].validation_details.title[0].kind,
            MatchKind::Semantic
        );
    }

    struct PanickingEmbedder {
        poison: &'static str,
        inner: HashEmbedder,
    }

    impl Embedder for PanickingEmbedder {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn embed(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
            if texts.contains(&self.poison) {
                panic!("embedding backend crashed on {:?}", self.poison);
            }
            self.inner.embed(texts)
        }
    }

    #[test]
    fn test_panicking_job_is_skipped_not_fatal() {
        let recommender = Recommender::new(
            Arc::new(Catalog::from_jobs(vec![
                job("BAD", "Broken Row", "Pune", &["Java"], [0, 1]),
                job("GOOD", "Backend Developer", "Pune", &["Java"], [0, 1]),
            ])),
            Arc::new(SemanticMatcher::lazy(|| -> anyhow::Result<Box<dyn Embedder>> {
                Ok(Box::new(PanickingEmbedder {
                    poison: "Broken Row",
                    inner: HashEmbedder::default(),
                }))
            })),
            Arc::new(FallbackNarrativeGenerator),
        );
        let prefs = CandidatePreferences {
            titles: strings(&["Backend Developer"]),
            ..Default::default()
        };

        let ranked = recommender.rank(&prefs, &weights(0.0, 1.0, 0.0, 0.0, 0.0));

        let ids: Vec<_> = ranked.iter().map(|m| m.job.id.as_str()).collect();
        assert_eq!(ids, vec!["GOOD"]);
        assert_eq!(ranked[0].match_score, 100);
    }

    #[tokio::test]
    async fn test_empty_catalog_returns_empty() {
        let recommender = degraded_recommender(vec![]);
        let results = recommender
            .recommend(&CandidatePreferences::default(), &weights(1.0, 1.0, 1.0, 1.0, 1.0))
            .await;
        assert!(results.is_empty());
    }
}
