//! Resume extraction: PDF text → LLM → preference fields the UI can pre-fill.

pub mod handlers;
pub mod prompts;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmClient, LlmError};
use crate::resume::prompts::{RESUME_EXTRACT_PROMPT, RESUME_EXTRACT_SYSTEM};

/// Keeps prompts bounded for very long resumes.
const MAX_RESUME_CHARS: usize = 20_000;

/// Preference fields extracted from a resume. Missing lists are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedProfile {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub titles: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub industries: Vec<String>,
}

/// Extracts plain text from PDF bytes. Blocking; call from `spawn_blocking`.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, AppError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| AppError::UnprocessableEntity(format!("Could not read the PDF: {e}")))?;
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "Could not extract text from the resume PDF".to_string(),
        ));
    }
    Ok(text.to_string())
}

/// Asks the LLM for preference fields found in `resume_text`.
pub async fn extract_profile(resume_text: &str, llm: &LlmClient) -> Result<ExtractedProfile, AppError> {
    if !llm.is_configured() {
        return Err(AppError::ServiceUnavailable(
            "Resume analysis is not configured on this server".to_string(),
        ));
    }

    let truncated: String = resume_text.chars().take(MAX_RESUME_CHARS).collect();
    let prompt = RESUME_EXTRACT_PROMPT.replace("{resume_text}", &truncated);
    let system = format!("{RESUME_EXTRACT_SYSTEM} {JSON_ONLY_SYSTEM}");

    let profile = llm
        .call_json::<ExtractedProfile>(&prompt, &system)
        .await
        .map_err(|e| match e {
            LlmError::NotConfigured => AppError::ServiceUnavailable(e.to_string()),
            other => AppError::Llm(format!("Resume extraction failed: {other}")),
        })?;

    info!(
        skills = profile.skills.len(),
        titles = profile.titles.len(),
        "Resume analysed"
    );
    Ok(profile)
}
