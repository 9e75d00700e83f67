//! Narrative generation: a short "why this job fits" story per top result.
//!
//! Pluggable like the scorers: `Recommender` holds an `Arc<dyn NarrativeGenerator>`.
//! Generators never fail; they return `Narrative::Fallback` with a deterministic
//! sentence built from the job's own required skills.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::llm_client::prompts::GROUNDING_INSTRUCTION;
use crate::llm_client::LlmClient;
use crate::models::{CandidatePreferences, JobRecord};
use crate::recommendation::prompts::{STORY_PROMPT_TEMPLATE, STORY_SYSTEM};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Narrative {
    Generated(String),
    Fallback(String),
}

impl Narrative {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Narrative::Fallback(_))
    }

    pub fn into_text(self) -> String {
        match self {
            Narrative::Generated(text) | Narrative::Fallback(text) => text,
        }
    }
}

/// Deterministic story naming up to two of the job's required skills.
pub fn fallback_story(job: &JobRecord) -> String {
    if job.required_skills.is_empty() {
        return "This role aligns well with your background and preferences.".to_string();
    }
    let skills: Vec<&str> = job
        .required_skills
        .iter()
        .take(2)
        .map(String::as_str)
        .collect();
    format!(
        "This role aligns well with your skills in {}.",
        skills.join(", ")
    )
}

#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, prefs: &CandidatePreferences, job: &JobRecord) -> Narrative;
}

/// Always answers with the fallback story. Used when no LLM is configured.
pub struct FallbackNarrativeGenerator;

#[async_trait]
impl NarrativeGenerator for FallbackNarrativeGenerator {
    async fn generate(&self, _prefs: &CandidatePreferences, job: &JobRecord) -> Narrative {
        Narrative::Fallback(fallback_story(job))
    }
}

/// Claude-backed narratives. One attempt per job, no retry.
pub struct LlmNarrativeGenerator(pub LlmClient);

#[async_trait]
impl NarrativeGenerator for LlmNarrativeGenerator {
    async fn generate(&self, prefs: &CandidatePreferences, job: &JobRecord) -> Narrative {
        let prompt = build_story_prompt(prefs, job);

        match self.0.call_once(&prompt, STORY_SYSTEM).await {
            Ok(response) => match response.text().map(str::trim) {
                Some(text) if !text.is_empty() => {
                    debug!(job_id = %job.id, "Narrative generated");
                    Narrative::Generated(text.to_string())
                }
                _ => {
                    warn!(job_id = %job.id, "Narrative backend returned no text, using fallback");
                    Narrative::Fallback(fallback_story(job))
                }
            },
            Err(e) => {
                warn!(job_id = %job.id, "Narrative generation failed, using fallback: {e}");
                Narrative::Fallback(fallback_story(job))
            }
        }
    }
}

fn build_story_prompt(prefs: &CandidatePreferences, job: &JobRecord) -> String {
    STORY_PROMPT_TEMPLATE
        .replace("{candidate_skills}", &prefs.skills.join(", "))
        .replace("{job_title}", &job.title)
        .replace("{company}", &job.company)
        .replace("{required_skills}", &job.required_skills.join(", "))
        .replace("{grounding}", GROUNDING_INSTRUCTION)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_with_skills(skills: &[&str]) -> JobRecord {
        JobRecord {
            id: "ZOHO-3".to_string(),
            title: "Senior Data Scientist".to_string(),
            company: "Zoho Corporation".to_string(),
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_fallback_names_two_skills() {
        let job = job_with_skills(&["Python", "SQL", "PyTorch"]);
        assert_eq!(
            fallback_story(&job),
            "This role aligns well with your skills in Python, SQL."
        );
    }

    #[test]
    fn test_fallback_single_skill_has_no_comma() {
        let job = job_with_skills(&["Kotlin"]);
        assert_eq!(
            fallback_story(&job),
            "This role aligns well with your skills in Kotlin."
        );
    }

    #[test]
    fn test_fallback_without_skills_is_a_full_sentence() {
        let job = job_with_skills(&[]);
        assert_eq!(
            fallback_story(&job),
            "This role aligns well with your background and preferences."
        );
    }

    #[test]
    fn test_prompt_carries_candidate_and_job_facts() {
        let prefs = CandidatePreferences {
            skills: vec!["Python".to_string(), "Pandas".to_string()],
            ..Default::default()
        };
        let prompt = build_story_prompt(&prefs, &job_with_skills(&["Python", "SQL"]));
        assert!(prompt.contains("Candidate Skills: Python, Pandas"));
        assert!(prompt.contains("Job Title: Senior Data Scientist"));
        assert!(prompt.contains("Required Skills: Python, SQL"));
        assert!(!prompt.contains('{'));
    }

    #[tokio::test]
    async fn test_unconfigured_llm_falls_back() {
        let generator = LlmNarrativeGenerator(LlmClient::new(None));
        let narrative = generator
            .generate(&CandidatePreferences::default(), &job_with_skills(&["Go", "gRPC"]))
            .await;
        assert_eq!(
            narrative,
            Narrative::Fallback("This role aligns well with your skills in Go, gRPC.".to_string())
        );
    }

    #[tokio::test]
    async fn test_fallback_generator_is_never_generated() {
        let narrative = FallbackNarrativeGenerator
            .generate(&CandidatePreferences::default(), &job_with_skills(&["AWS"]))
            .await;
        assert!(narrative.is_fallback());
        assert!(!narrative.into_text().is_empty());
    }
}
