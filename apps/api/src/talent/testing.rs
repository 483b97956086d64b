//! In-memory fakes for the store and narrative seams.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::llm_client::LlmError;
use crate::models::benchmark::BenchmarkRequest;
use crate::models::employee::EmployeeRow;
use crate::talent::narrative::NarrativeGenerator;
use crate::talent::store::TalentStore;

pub fn employee(id: &str, name: &str) -> EmployeeRow {
    EmployeeRow {
        employee_id: id.to_string(),
        fullname: name.to_string(),
    }
}

/// One scoring-result row in the shape the SQL function returns.
pub fn result_record(
    id: &str,
    name: &str,
    tgv: &str,
    tv: &str,
    baseline: f64,
    user_score: f64,
    final_match: f64,
) -> Value {
    let relative = if baseline > 0.0 {
        (user_score / baseline * 100.0).min(100.0)
    } else {
        0.0
    };
    json!({
        "employee_id": id,
        "fullname": name,
        "position_name": "Data Analyst",
        "directorate": "Commercial",
        "grade": "III",
        "tgv_name": tgv,
        "tv_name": tv,
        "baseline_score": baseline,
        "user_score": user_score,
        "tv_match_rate": relative,
        "tgv_match_rate": 70.0,
        "final_match_rate": final_match
    })
}

#[derive(Default)]
pub struct FakeStore {
    pub employees: Vec<EmployeeRow>,
    pub results: Vec<Value>,
    pub benchmarks: Mutex<Vec<BenchmarkRequest>>,
    pub directory_calls: AtomicUsize,
    pub scoring_calls: AtomicUsize,
    pub fail_directory: AtomicBool,
    pub fail_benchmark: AtomicBool,
    pub fail_scoring: AtomicBool,
}

impl FakeStore {
    pub fn with_employees(employees: Vec<EmployeeRow>) -> Self {
        Self {
            employees,
            ..Self::default()
        }
    }

    pub fn with_results(mut self, results: Vec<Value>) -> Self {
        self.results = results;
        self
    }
}

#[async_trait]
impl TalentStore for FakeStore {
    async fn list_employees(&self) -> Result<Vec<EmployeeRow>, AppError> {
        self.directory_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_directory.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.employees.clone())
    }

    async fn insert_benchmark(&self, benchmark: &BenchmarkRequest) -> Result<(), AppError> {
        if self.fail_benchmark.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        self.benchmarks.lock().unwrap().push(benchmark.clone());
        Ok(())
    }

    async fn fetch_match_results(&self) -> Result<Vec<Value>, AppError> {
        self.scoring_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_scoring.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.results.clone())
    }
}

/// Echoes a fixed reply, or fails every prompt containing `fail_on`.
#[derive(Default)]
pub struct FakeNarrator {
    pub fail_on: Option<&'static str>,
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl NarrativeGenerator for FakeNarrator {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.fail_on {
            Some(marker) if prompt.contains(marker) => Err(LlmError::Api {
                status: 529,
                message: "overloaded".to_string(),
            }),
            _ => Ok(format!("narrative #{}", self.prompts.lock().unwrap().len())),
        }
    }
}
