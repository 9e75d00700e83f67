// Resume extraction prompt templates.

pub const RESUME_EXTRACT_SYSTEM: &str = "\
You are a precise resume data extractor. \
You read plain resume text and return the candidate's job-search preferences as JSON. \
Extract only what the resume supports; use empty lists when nothing applies.";

pub const RESUME_EXTRACT_PROMPT: &str = r#"Analyze the following resume text and extract:

- "skills": technical and soft skills found in the resume
- "titles": job titles the candidate is a fit for, based on their experience
- "locations": preferred work locations, if mentioned
- "industries": industries the candidate has experience in

OUTPUT SCHEMA (return exactly this structure):
{"skills": ["string"], "titles": ["string"], "locations": ["string"], "industries": ["string"]}

RESUME TEXT:
{resume_text}"#;
