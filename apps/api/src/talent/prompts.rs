// Narrative prompt templates for a talent-match run.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Job profile prompt. Replace: {role_name}, {job_level}, {role_purpose}
pub const JOB_PROFILE_PROMPT_TEMPLATE: &str = r#"Write a job profile for the role "{role_name}" at the {job_level} level.

Role purpose: {role_purpose}

Include three sections:
1. Job requirements
2. Job description
3. Key competencies"#;

/// Success formula prompt. Replace: {grounding_instruction}, {ranking_table}
pub const SUCCESS_FORMULA_PROMPT_TEMPLATE: &str = r#"{grounding_instruction}

These are the top-ranked employees by final match rate against the selected benchmark:

{ranking_table}

Explain why these employees stand out and what the main success factors behind their match appear to be."#;

/// Candidate insight prompt. Replace: {grounding_instruction}, {ranking_table}, {role_name}
pub const CANDIDATE_INSIGHTS_PROMPT_TEMPLATE: &str = r#"{grounding_instruction}

From the following top candidates for the role "{role_name}":

{ranking_table}

Recommend which candidate fits best and give a short justification for each of the top three."#;
