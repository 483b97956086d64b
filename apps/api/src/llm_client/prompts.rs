// Shared prompt fragments. Each service that needs LLM calls defines its own
// prompts.rs alongside it; this file holds the cross-cutting pieces.

/// System prompt for narrative output that is shown to people as-is.
pub const NARRATIVE_SYSTEM: &str = "You are an experienced talent management consultant. \
    Write clear, concise analysis in Markdown. \
    Do NOT wrap the answer in code fences. \
    Do NOT include apologies or disclaimers about being an AI.";

/// Appended to every prompt that carries tabular data.
pub const GROUNDING_INSTRUCTION: &str = "\
    Base every statement on the data provided. Do NOT invent scores, names, or \
    attributes that do not appear in it. If the data is insufficient for a claim, say so.";
