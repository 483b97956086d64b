//! Remote store access — the three calls the pipeline depends on.
//!
//! `AppState` carries an `Arc<dyn TalentStore>`; the PostgreSQL implementation
//! is constructed once in `main`.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;

use crate::errors::AppError;
use crate::models::benchmark::BenchmarkRequest;
use crate::models::employee::EmployeeRow;

#[async_trait]
pub trait TalentStore: Send + Sync {
    /// Subject directory. May be empty.
    async fn list_employees(&self) -> Result<Vec<EmployeeRow>, AppError>;

    /// Persists the benchmark the next scoring call will read.
    async fn insert_benchmark(&self, benchmark: &BenchmarkRequest) -> Result<(), AppError>;

    /// Invokes `get_talent_match_results()` and returns each result row as an
    /// untyped JSON object. May be empty.
    async fn fetch_match_results(&self) -> Result<Vec<Value>, AppError>;
}

pub struct PgTalentStore {
    pool: PgPool,
}

impl PgTalentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TalentStore for PgTalentStore {
    async fn list_employees(&self) -> Result<Vec<EmployeeRow>, AppError> {
        let rows = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT employee_id::text AS employee_id, fullname
            FROM employees
            WHERE fullname IS NOT NULL
            ORDER BY fullname
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        info!("Loaded {} employees from directory", rows.len());
        Ok(rows)
    }

    async fn insert_benchmark(&self, benchmark: &BenchmarkRequest) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO talent_benchmarks
                (role_name, job_level, role_purpose, selected_talent_ids)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&benchmark.role_name)
        .bind(benchmark.job_level.as_str())
        .bind(&benchmark.role_purpose)
        .bind(&benchmark.selected_talent_ids)
        .execute(&self.pool)
        .await?;

        info!(
            "Saved benchmark for role '{}' ({}) with {} employees",
            benchmark.role_name,
            benchmark.job_level,
            benchmark.selected_talent_ids.len()
        );
        Ok(())
    }

    async fn fetch_match_results(&self) -> Result<Vec<Value>, AppError> {
        // row_to_json keeps whatever columns the function currently returns;
        // ingestion maps them onto the canonical schema.
        let records = sqlx::query_scalar::<_, Value>(
            "SELECT row_to_json(r) FROM get_talent_match_results() AS r",
        )
        .fetch_all(&self.pool)
        .await?;

        info!("get_talent_match_results returned {} rows", records.len());
        Ok(records)
    }
}
