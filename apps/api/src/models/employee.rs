use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One entry of the subject directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct EmployeeRow {
    pub employee_id: String,
    pub fullname: String,
}
