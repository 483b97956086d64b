//! Subject directory — cached employee list and benchmark name/id resolution.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::cache::{Clock, TtlCache};
use crate::errors::AppError;
use crate::models::employee::EmployeeRow;
use crate::talent::store::TalentStore;

pub const MIN_BENCHMARK: usize = 1;
pub const MAX_BENCHMARK: usize = 3;

const DIRECTORY_KEY: &str = "employees";

/// Read-through cache over `TalentStore::list_employees`.
pub struct EmployeeDirectory {
    cache: TtlCache<&'static str, Arc<Vec<EmployeeRow>>>,
    ttl: Duration,
}

impl EmployeeDirectory {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache: TtlCache::new(clock),
            ttl,
        }
    }

    pub async fn employees(
        &self,
        store: &dyn TalentStore,
    ) -> Result<Arc<Vec<EmployeeRow>>, AppError> {
        self.cache
            .get_or_fetch(DIRECTORY_KEY, self.ttl, || async {
                store.list_employees().await.map(Arc::new)
            })
            .await
    }

    /// Drops the cached list so the next read goes to the store.
    pub fn refresh(&self) {
        self.cache.invalidate(&DIRECTORY_KEY);
    }
}

/// Resolves benchmark selections (ids or full names) to employee ids.
///
/// Exact id matches win over name matches; names compare trimmed and
/// case-insensitively. Duplicates collapse to their first occurrence, then the
/// 1–3 bound is enforced.
pub fn resolve_benchmark(
    selections: &[String],
    employees: &[EmployeeRow],
) -> Result<Vec<String>, AppError> {
    let mut resolved: Vec<String> = Vec::new();
    let mut unknown: Vec<&str> = Vec::new();

    for selection in selections {
        let wanted = selection.trim();
        if wanted.is_empty() {
            continue;
        }

        let found = employees
            .iter()
            .find(|e| e.employee_id == wanted)
            .or_else(|| {
                employees
                    .iter()
                    .find(|e| e.fullname.trim().eq_ignore_ascii_case(wanted))
            });

        match found {
            Some(employee) if !resolved.contains(&employee.employee_id) => {
                resolved.push(employee.employee_id.clone());
            }
            Some(_) => {}
            None => unknown.push(wanted),
        }
    }

    if !unknown.is_empty() {
        warn!("Unknown benchmark selections: {unknown:?}");
        return Err(AppError::Validation(format!(
            "Unknown benchmark employees: {}",
            unknown.join(", ")
        )));
    }

    if resolved.len() < MIN_BENCHMARK {
        return Err(AppError::Validation(
            "Select at least one benchmark employee.".to_string(),
        ));
    }
    if resolved.len() > MAX_BENCHMARK {
        return Err(AppError::Validation(format!(
            "Select at most {MAX_BENCHMARK} benchmark employees (got {}).",
            resolved.len()
        )));
    }

    Ok(resolved)
}
