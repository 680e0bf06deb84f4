// Cross-cutting prompt fragments shared by the pipeline stages.
// Each stage defines its own prompts.rs alongside it; this file holds only
// the fragments reused everywhere.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Instruction appended to every prompt that rewrites candidate material.
/// The personalization boundary re-checks what it can, but the primary
/// defense against fabricated employers, dates, and metrics is here.
pub const NO_FABRICATION_INSTRUCTION: &str = "\
    CRITICAL: Use ONLY facts present in the supplied candidate data. \
    Do NOT invent employers, job titles, dates, certifications, or metrics. \
    If the source data does not support a claim, omit the claim entirely.";
