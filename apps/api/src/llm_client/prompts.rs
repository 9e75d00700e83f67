// Shared prompt fragments. Each service that calls the LLM keeps its own
// prompts.rs alongside it; cross-cutting pieces live here.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Keeps generated text tied to the facts supplied in the prompt.
pub const GROUNDING_INSTRUCTION: &str = "\
    Only use the facts provided below. Do NOT invent employers, skills, \
    salaries or requirements that are not listed.";
