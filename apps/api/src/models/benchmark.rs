use std::fmt;

use serde::{Deserialize, Serialize};

/// Job levels offered by the benchmark form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobLevel {
    Staff,
    Supervisor,
    Manager,
    #[serde(rename = "Senior Manager")]
    SeniorManager,
}

impl JobLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            JobLevel::Staff => "Staff",
            JobLevel::Supervisor => "Supervisor",
            JobLevel::Manager => "Manager",
            JobLevel::SeniorManager => "Senior Manager",
        }
    }
}

impl fmt::Display for JobLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated benchmark selection, written once per run before scoring.
/// The scoring function reads the most recent row implicitly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkRequest {
    pub role_name: String,
    pub job_level: JobLevel,
    pub role_purpose: String,
    /// 1 to 3 resolved employee ids.
    pub selected_talent_ids: Vec<String>,
}
