//! Narrative generation — three LLM-written sections that accompany a ranking.
//!
//! Failures here never affect the ranking: each section reports its own outcome.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, NARRATIVE_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};
use crate::models::benchmark::JobLevel;
use crate::talent::prompts::{
    CANDIDATE_INSIGHTS_PROMPT_TEMPLATE, JOB_PROFILE_PROMPT_TEMPLATE,
    SUCCESS_FORMULA_PROMPT_TEMPLATE,
};
use crate::talent::ranking::{Ranking, TopK};

/// Number of ranked subjects shown to the model.
pub const NARRATIVE_TOP_N: usize = 5;

/// Text generation seam. Carried in `AppState` as `Option<Arc<dyn NarrativeGenerator>>`.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

#[async_trait]
impl NarrativeGenerator for LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.call_text(prompt, NARRATIVE_SYSTEM).await
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NarrativeSection {
    Generated { text: String },
    Failed { error: String },
}

impl NarrativeSection {
    fn from_result(section: &str, result: Result<String, LlmError>) -> Self {
        match result {
            Ok(text) => NarrativeSection::Generated { text },
            Err(e) => {
                warn!("Narrative section '{section}' failed: {e}");
                NarrativeSection::Failed {
                    error: format!("[AI Error] {e}"),
                }
            }
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, NarrativeSection::Generated { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NarrativeReport {
    /// No LLM key configured.
    Disabled { reason: String },
    /// The request opted out.
    Skipped,
    Completed {
        job_profile: NarrativeSection,
        success_formula: NarrativeSection,
        candidate_insights: NarrativeSection,
    },
}

/// Role fields that feed the job profile prompt.
#[derive(Debug, Clone, Copy)]
pub struct RoleContext<'a> {
    pub role_name: &'a str,
    pub job_level: JobLevel,
    pub role_purpose: &'a str,
}

/// Runs the three narrative prompts in order. Never fails as a whole.
pub async fn generate_narratives(
    generator: &dyn NarrativeGenerator,
    role: RoleContext<'_>,
    ranking: &Ranking,
) -> NarrativeReport {
    let table = render_ranking_table(ranking);

    let job_profile_prompt = JOB_PROFILE_PROMPT_TEMPLATE
        .replace("{role_name}", role.role_name)
        .replace("{job_level}", role.job_level.as_str())
        .replace("{role_purpose}", role.role_purpose);
    let success_prompt = SUCCESS_FORMULA_PROMPT_TEMPLATE
        .replace("{grounding_instruction}", GROUNDING_INSTRUCTION)
        .replace("{ranking_table}", &table);
    let candidate_prompt = CANDIDATE_INSIGHTS_PROMPT_TEMPLATE
        .replace("{grounding_instruction}", GROUNDING_INSTRUCTION)
        .replace("{ranking_table}", &table)
        .replace("{role_name}", role.role_name);

    let job_profile =
        NarrativeSection::from_result("job_profile", generator.generate(&job_profile_prompt).await);
    let success_formula =
        NarrativeSection::from_result("success_formula", generator.generate(&success_prompt).await);
    let candidate_insights = NarrativeSection::from_result(
        "candidate_insights",
        generator.generate(&candidate_prompt).await,
    );

    let generated = [&job_profile, &success_formula, &candidate_insights]
        .iter()
        .filter(|s| s.is_generated())
        .count();
    info!("Narrative generation finished: {generated}/3 sections generated");

    NarrativeReport::Completed {
        job_profile,
        success_formula,
        candidate_insights,
    }
}

/// Markdown table of the top ranked subjects.
pub fn render_ranking_table(ranking: &Ranking) -> String {
    let mut md = String::from(
        "| Rank | Employee ID | Name | Position | Directorate | Grade | Final Match Rate |\n\
         |---|---|---|---|---|---|---|\n",
    );
    for subject in ranking.top(TopK::Limit(NARRATIVE_TOP_N)) {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {:.2} |\n",
            subject.rank,
            escape_cell(&subject.subject_id),
            escape_cell(&subject.subject_name),
            escape_cell(&subject.position),
            escape_cell(&subject.department),
            escape_cell(&subject.level),
            subject.final_score
        ));
    }
    md
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::talent::ingest::ingest_records;
    use crate::talent::ranking::{rank_subjects, ScoreSource};
    use crate::talent::testing::{result_record, FakeNarrator};

    fn ranking(n: usize) -> Ranking {
        let records: Vec<_> = (0..n)
            .map(|i| {
                result_record(
                    &format!("E{i}"),
                    &format!("Person {i}"),
                    "Leadership",
                    "Competency_X",
                    4.0,
                    3.0,
                    90.0 - i as f64,
                )
            })
            .collect();
        rank_subjects(&ingest_records(&records).rows, ScoreSource::ServerFinal)
    }

    fn role() -> RoleContext<'static> {
        RoleContext {
            role_name: "Data Analyst",
            job_level: JobLevel::Manager,
            role_purpose: "Analyse sales performance",
        }
    }

    #[test]
    fn test_table_lists_top_five_only() {
        let table = render_ranking_table(&ranking(8));
        assert_eq!(table.lines().count(), 2 + NARRATIVE_TOP_N);
        assert!(table.contains("| 1 | E0 | Person 0 |"));
        assert!(table.contains("90.00"));
        assert!(!table.contains("Person 5"));
    }

    #[test]
    fn test_table_escapes_pipes() {
        assert_eq!(escape_cell("A|B\nC"), "A\\|B C");
    }

    #[tokio::test]
    async fn test_all_sections_generated() {
        let narrator = FakeNarrator::default();
        let report = generate_narratives(&narrator, role(), &ranking(3)).await;

        let prompts = narrator.prompts.lock().unwrap().clone();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].contains("Data Analyst") && prompts[0].contains("Manager"));
        assert!(prompts[1].contains("| 1 | E0 |"));
        assert!(prompts[2].contains(GROUNDING_INSTRUCTION));

        match report {
            NarrativeReport::Completed {
                job_profile,
                success_formula,
                candidate_insights,
            } => {
                assert!(job_profile.is_generated());
                assert!(success_formula.is_generated());
                assert!(candidate_insights.is_generated());
            }
            other => panic!("unexpected report: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_one_failed_section_does_not_stop_others() {
        let narrator = FakeNarrator {
            fail_on: Some("success factors"),
            ..FakeNarrator::default()
        };
        let report = generate_narratives(&narrator, role(), &ranking(3)).await;

        let NarrativeReport::Completed {
            job_profile,
            success_formula,
            candidate_insights,
        } = report
        else {
            panic!("expected completed report");
        };
        assert!(job_profile.is_generated());
        assert!(matches!(
            success_formula,
            NarrativeSection::Failed { ref error } if error.starts_with("[AI Error]")
        ));
        assert!(candidate_insights.is_generated());
    }

    #[test]
    fn test_report_serializes_with_status_tags() {
        let report = NarrativeReport::Completed {
            job_profile: NarrativeSection::Generated { text: "x".into() },
            success_formula: NarrativeSection::Failed { error: "e".into() },
            candidate_insights: NarrativeSection::Generated { text: "y".into() },
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], "completed");
        assert_eq!(value["success_formula"]["status"], "failed");
        assert_eq!(value["job_profile"]["text"], "x");
    }
}
