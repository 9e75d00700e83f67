// Recommendation narrative prompt templates.

pub const STORY_SYSTEM: &str = "\
You are an expert career coach. You write short, encouraging, plain-text \
explanations of why a job fits a candidate. No markdown, no lists, no preamble.";

pub const STORY_PROMPT_TEMPLATE: &str = r#"Write a concise, encouraging, 2-sentence "Match Story" explaining why this job fits the candidate.

Candidate Skills: {candidate_skills}
Job Title: {job_title}
Company: {company}
Required Skills: {required_skills}

Focus on connecting the candidate's skills to the job's requirements.
{grounding}"#;
