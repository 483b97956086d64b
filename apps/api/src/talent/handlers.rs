//! Axum route handlers for the Talent Match API.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::employee::EmployeeRow;
use crate::state::AppState;
use crate::talent::pipeline::{
    run_talent_match, PipelineDefaults, TalentMatchOutcome, TalentMatchRequest,
};

#[derive(Debug, Default, Deserialize)]
pub struct DirectoryQuery {
    /// Bypass the cache and reload from the store.
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DirectoryResponse {
    Ok { employees: Vec<EmployeeRow> },
    NoData { message: String },
}

/// GET /api/v1/employees[?refresh=true]
///
/// Returns the (cached) employee directory used to pick benchmark employees.
pub async fn handle_list_employees(
    State(state): State<AppState>,
    Query(params): Query<DirectoryQuery>,
) -> Result<Json<DirectoryResponse>, AppError> {
    if params.refresh {
        state.directory.refresh();
    }
    let employees = state.directory.employees(state.store.as_ref()).await?;

    if employees.is_empty() {
        return Ok(Json(DirectoryResponse::NoData {
            message: "No employee data found in the directory.".to_string(),
        }));
    }

    Ok(Json(DirectoryResponse::Ok {
        employees: employees.to_vec(),
    }))
}

/// POST /api/v1/talent-match
///
/// Saves the benchmark, runs the scoring function and returns the ranked talent list.
pub async fn handle_talent_match(
    State(state): State<AppState>,
    Json(request): Json<TalentMatchRequest>,
) -> Result<Json<TalentMatchOutcome>, AppError> {
    let defaults = PipelineDefaults {
        recalibrate: state.config.recalibrate_scores,
        top_k: state.config.default_top_k,
    };

    let outcome = run_talent_match(
        state.store.as_ref(),
        &state.directory,
        state.narrator.as_deref(),
        request,
        defaults,
    )
    .await?;

    Ok(Json(outcome))
}
