// LLM prompt constants for the extraction stage.

/// Extraction prompt template. Replace `{page_text}` before sending.
///
/// The "no markdown, no preamble" instruction is the sole mitigation for
/// malformed output — parsing is strict and never repairs fenced JSON.
pub const EXTRACT_PROMPT_TEMPLATE: &str = r#"You are an intelligent assistant.

Given the following job post:

{page_text}

Extract the following as JSON:
- role
- description
- skills (as a list)

Only return valid JSON. No explanations, no markdown, no preamble."#;
