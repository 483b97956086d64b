//! Talent match run — orchestrates one form submission end to end.
//!
//! Flow: validate → resolve benchmark → write benchmark → scoring call →
//!       ingest → (recalibrate) → rank → summarize → narrate.
//!
//! The benchmark write and the scoring call are fatal on failure. An empty
//! directory is a `NoData` outcome and an empty scoring result is a `NoResults`
//! outcome; neither is an error. Narrative failures are
//! reported inside a completed report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::benchmark::{BenchmarkRequest, JobLevel};
use crate::talent::directory::{resolve_benchmark, EmployeeDirectory};
use crate::talent::ingest::{ingest_records, CanonicalField};
use crate::talent::narrative::{
    generate_narratives, NarrativeGenerator, NarrativeReport, RoleContext,
};
use crate::talent::ranking::{rank_subjects, RankedSubject, ScoreSource, TopK};
use crate::talent::recalibration::recalibrate;
use crate::talent::store::TalentStore;
use crate::talent::summary::{
    score_distribution, top_group_averages, GroupAverage, HistogramBin, DISTRIBUTION_BINS,
    TOP_GROUPS,
};

// ────────────────────────────────────────────────────────────────────────────
// Request / outcome types
// ────────────────────────────────────────────────────────────────────────────

/// Form submission.
#[derive(Debug, Clone, Deserialize)]
pub struct TalentMatchRequest {
    pub role_name: String,
    pub job_level: JobLevel,
    #[serde(default)]
    pub role_purpose: String,
    /// Employee ids or full names, 1 to 3 after de-duplication.
    pub benchmark_employees: Vec<String>,
    /// Falls back to the configured default.
    pub recalibrate: Option<bool>,
    pub top_k: Option<TopK>,
    #[serde(default = "default_true")]
    pub include_narrative: bool,
}

fn default_true() -> bool {
    true
}

/// Server-side defaults for optional request fields.
#[derive(Debug, Clone, Copy)]
pub struct PipelineDefaults {
    pub recalibrate: bool,
    pub top_k: TopK,
}

#[derive(Debug, Clone, Serialize)]
pub struct TalentMatchReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub role_name: String,
    pub job_level: JobLevel,
    pub benchmark_employee_ids: Vec<String>,
    pub recalibrated: bool,
    pub top_k: TopK,
    /// Distinct subjects in the full ranking.
    pub total_subjects: usize,
    /// The requested window of the ranking.
    pub subjects: Vec<RankedSubject>,
    pub score_distribution: Vec<HistogramBin>,
    pub top_attribute_groups: Vec<GroupAverage>,
    pub narrative: NarrativeReport,
    /// Non-fatal issues, e.g. columns missing from the scoring result.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TalentMatchOutcome {
    /// The subject directory is empty, so no benchmark can be resolved.
    NoData { run_id: Uuid, message: String },
    NoResults { run_id: Uuid, message: String },
    Completed(Box<TalentMatchReport>),
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs one talent match.
pub async fn run_talent_match(
    store: &dyn TalentStore,
    directory: &EmployeeDirectory,
    narrator: Option<&dyn NarrativeGenerator>,
    request: TalentMatchRequest,
    defaults: PipelineDefaults,
) -> Result<TalentMatchOutcome, AppError> {
    let run_id = Uuid::new_v4();

    // Step 1: Validate and resolve the benchmark
    let role_name = request.role_name.trim().to_string();
    if role_name.is_empty() {
        return Err(AppError::Validation("role_name cannot be empty".to_string()));
    }
    if request.benchmark_employees.iter().all(|s| s.trim().is_empty()) {
        return Err(AppError::Validation(
            "Select at least one benchmark employee.".to_string(),
        ));
    }

    let employees = directory.employees(store).await?;
    if employees.is_empty() {
        warn!(%run_id, "Employee directory is empty; nothing to benchmark against");
        return Ok(TalentMatchOutcome::NoData {
            run_id,
            message: "No employee data found in the directory.".to_string(),
        });
    }
    let selected_talent_ids = resolve_benchmark(&request.benchmark_employees, &employees)?;

    let benchmark = BenchmarkRequest {
        role_name,
        job_level: request.job_level,
        role_purpose: request.role_purpose.trim().to_string(),
        selected_talent_ids,
    };

    // Step 2: Persist benchmark (must succeed before scoring)
    store
        .insert_benchmark(&benchmark)
        .await
        .map_err(|e| AppError::Upstream {
            stage: "Failed to save benchmark",
            message: e.to_string(),
        })?;
    info!(%run_id, "Benchmark saved for role '{}'", benchmark.role_name);

    // Step 3: Scoring call
    let records = store
        .fetch_match_results()
        .await
        .map_err(|e| AppError::Upstream {
            stage: "Error running get_talent_match_results",
            message: e.to_string(),
        })?;

    // Step 4: Ingest
    let ingested = ingest_records(&records);
    if ingested.is_empty() {
        warn!(%run_id, "get_talent_match_results returned no rows");
        return Ok(TalentMatchOutcome::NoResults {
            run_id,
            message: "No results were returned by get_talent_match_results.".to_string(),
        });
    }

    let mut warnings = Vec::new();
    if !ingested.missing_fields.is_empty() {
        let missing: Vec<&str> = ingested.missing_fields.iter().map(|f| f.as_str()).collect();
        warn!(%run_id, "Scoring result is missing columns: {missing:?}");
        warnings.push(format!(
            "Scoring result is missing columns (defaulted): {}",
            missing.join(", ")
        ));
    }

    // Step 5: Recalibrate (optional) and rank
    let recalibrated = request.recalibrate.unwrap_or(defaults.recalibrate);
    let ranking = if recalibrated {
        let server_relative = ingested.has_field(CanonicalField::RelativeMatch);
        if !server_relative {
            warnings.push(
                "Relative match was derived from observed/baseline scores.".to_string(),
            );
        }
        let scores = recalibrate(&ingested.rows, server_relative);
        rank_subjects(&ingested.rows, ScoreSource::Recalibrated(&scores))
    } else {
        rank_subjects(&ingested.rows, ScoreSource::ServerFinal)
    };
    info!(
        %run_id,
        "Ranked {} subjects from {} rows (recalibrated={recalibrated})",
        ranking.len(),
        ingested.rows.len()
    );

    // Step 6: Summaries
    let score_distribution = score_distribution(ranking.all(), DISTRIBUTION_BINS);
    let top_attribute_groups = top_group_averages(&ingested.rows, TOP_GROUPS);

    // Step 7: Narrative (non-fatal)
    let narrative = match (request.include_narrative, narrator) {
        (false, _) => NarrativeReport::Skipped,
        (true, None) => NarrativeReport::Disabled {
            reason: "AI is not configured. Set ANTHROPIC_API_KEY to enable insights.".to_string(),
        },
        (true, Some(generator)) => {
            let role = RoleContext {
                role_name: &benchmark.role_name,
                job_level: benchmark.job_level,
                role_purpose: &benchmark.role_purpose,
            };
            generate_narratives(generator, role, &ranking).await
        }
    };

    let top_k = request.top_k.unwrap_or(defaults.top_k);
    let report = TalentMatchReport {
        run_id,
        generated_at: Utc::now(),
        role_name: benchmark.role_name,
        job_level: benchmark.job_level,
        benchmark_employee_ids: benchmark.selected_talent_ids,
        recalibrated,
        top_k,
        total_subjects: ranking.len(),
        subjects: ranking.top(top_k).to_vec(),
        score_distribution,
        top_attribute_groups,
        narrative,
        warnings,
    };

    Ok(TalentMatchOutcome::Completed(Box::new(report)))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
