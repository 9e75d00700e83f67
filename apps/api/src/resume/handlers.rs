//! Axum route handlers for resume extraction.

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::errors::AppError;
use crate::resume::{extract_pdf_text, extract_profile, ExtractedProfile};
use crate::state::AppState;

const RESUME_FIELD: &str = "resume";

/// POST /parse_resume
///
/// Multipart upload with a `resume` PDF field. Returns skills, titles,
/// locations and industries extracted from the resume.
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractedProfile>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some(RESUME_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
            upload = Some(bytes);
            break;
        }
    }

    let bytes = upload
        .filter(|b| !b.is_empty())
        .ok_or_else(|| AppError::Validation("No resume file provided".to_string()))?;

    // pdf-extract can panic on malformed documents; a panicked task surfaces as a JoinError
    let text = tokio::task::spawn_blocking(move || extract_pdf_text(&bytes))
        .await
        .map_err(|_| AppError::UnprocessableEntity("Failed to parse the resume PDF".to_string()))??;

    let profile = extract_profile(&text, &state.llm).await?;
    Ok(Json(profile))
}
