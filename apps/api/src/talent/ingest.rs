//! Result Ingestion — turns the loosely-typed records returned by
//! `get_talent_match_results` into canonical `MatchRow`s.
//!
//! The scoring function's output schema is not under our control and has drifted
//! between deployments, so parsing here is total: unknown keys are ignored, missing
//! keys default, numbers coerce to 0.0 and display strings collapse to `NOT_FOUND`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sentinel used for every missing or null-like descriptive value.
pub const NOT_FOUND: &str = "Not Found";

// ────────────────────────────────────────────────────────────────────────────
// Canonical schema
// ────────────────────────────────────────────────────────────────────────────

/// One row per (subject, attribute) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRow {
    pub subject_id: String,
    pub subject_name: String,
    pub position: String,
    pub department: String,
    pub level: String,
    /// TGV name.
    pub attribute_group: String,
    /// TV name.
    pub attribute_name: String,
    pub baseline_score: f64,
    pub observed_score: f64,
    pub relative_match: f64,
    pub group_match: f64,
    pub final_match: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    SubjectId,
    SubjectName,
    Position,
    Department,
    Level,
    AttributeGroup,
    AttributeName,
    BaselineScore,
    ObservedScore,
    RelativeMatch,
    GroupMatch,
    FinalMatch,
}

const FIELD_COUNT: usize = 12;

impl CanonicalField {
    pub const ALL: [CanonicalField; FIELD_COUNT] = [
        CanonicalField::SubjectId,
        CanonicalField::SubjectName,
        CanonicalField::Position,
        CanonicalField::Department,
        CanonicalField::Level,
        CanonicalField::AttributeGroup,
        CanonicalField::AttributeName,
        CanonicalField::BaselineScore,
        CanonicalField::ObservedScore,
        CanonicalField::RelativeMatch,
        CanonicalField::GroupMatch,
        CanonicalField::FinalMatch,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalField::SubjectId => "subject_id",
            CanonicalField::SubjectName => "subject_name",
            CanonicalField::Position => "position",
            CanonicalField::Department => "department",
            CanonicalField::Level => "level",
            CanonicalField::AttributeGroup => "attribute_group",
            CanonicalField::AttributeName => "attribute_name",
            CanonicalField::BaselineScore => "baseline_score",
            CanonicalField::ObservedScore => "observed_score",
            CanonicalField::RelativeMatch => "relative_match",
            CanonicalField::GroupMatch => "group_match",
            CanonicalField::FinalMatch => "final_match",
        }
    }

    /// Known column names for this field, already in normalized form.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            CanonicalField::SubjectId => &["subject_id", "employee_id", "employeeid", "emp_id"],
            CanonicalField::SubjectName => {
                &["subject_name", "fullname", "full_name", "employee_name", "name"]
            }
            CanonicalField::Position => &["position", "positionname", "position_name"],
            CanonicalField::Department => {
                &["department", "directorate", "directorate_name", "dept"]
            }
            CanonicalField::Level => &["level", "grade", "grade_name", "job_level"],
            CanonicalField::AttributeGroup => {
                &["attribute_group", "tgv_name", "tgv", "talent_group_variable"]
            }
            CanonicalField::AttributeName => {
                &["attribute_name", "tv_name", "tv", "talent_variable"]
            }
            CanonicalField::BaselineScore => &["baseline_score", "baseline", "benchmark_score"],
            CanonicalField::ObservedScore => {
                &["observed_score", "user_score", "employee_score", "score"]
            }
            CanonicalField::RelativeMatch => {
                &["relative_match", "tv_match_rate", "tv_match", "match_rate"]
            }
            CanonicalField::GroupMatch => &["group_match", "tgv_match_rate", "tgv_match"],
            CanonicalField::FinalMatch => &["final_match", "final_match_rate", "final_score"],
        }
    }

    /// Maps a raw column name onto a canonical field, if it is a known alias.
    pub fn from_column(column: &str) -> Option<CanonicalField> {
        Self::alias_position(column).map(|(field, _)| field)
    }

    /// Canonical field plus the alias's position in its table (0 = canonical name).
    fn alias_position(column: &str) -> Option<(CanonicalField, usize)> {
        let normalized = normalize_column(column);
        CanonicalField::ALL.into_iter().find_map(|field| {
            field
                .aliases()
                .iter()
                .position(|alias| *alias == normalized)
                .map(|pos| (field, pos))
        })
    }
}

/// Output of one ingestion pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub rows: Vec<MatchRow>,
    /// Canonical fields that no input record carried (schema drift).
    pub missing_fields: Vec<CanonicalField>,
}

impl IngestReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_field(&self, field: CanonicalField) -> bool {
        !self.missing_fields.contains(&field)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Ingestion
// ────────────────────────────────────────────────────────────────────────────

/// Ingests a full scoring-call result. An empty input yields an empty report.
pub fn ingest_records(records: &[Value]) -> IngestReport {
    if records.is_empty() {
        return IngestReport::default();
    }

    let mut seen: HashSet<CanonicalField> = HashSet::new();
    for record in records {
        if let Value::Object(map) = record {
            seen.extend(map.keys().filter_map(|k| CanonicalField::from_column(k)));
        }
    }

    let missing_fields = CanonicalField::ALL
        .into_iter()
        .filter(|field| !seen.contains(field))
        .collect();

    IngestReport {
        rows: records.iter().map(parse_match_row).collect(),
        missing_fields,
    }
}

/// Parses one record into a `MatchRow`. Never fails; non-object input yields a
/// row made entirely of defaults.
pub fn parse_match_row(record: &Value) -> MatchRow {
    let empty = Map::new();
    let map = record.as_object().unwrap_or(&empty);
    let columns = CanonicalColumns::resolve(map);

    MatchRow {
        subject_id: clean_text(columns.get(CanonicalField::SubjectId)),
        subject_name: clean_text(columns.get(CanonicalField::SubjectName)),
        position: clean_text(columns.get(CanonicalField::Position)),
        department: clean_text(columns.get(CanonicalField::Department)),
        level: clean_text(columns.get(CanonicalField::Level)),
        attribute_group: clean_text(columns.get(CanonicalField::AttributeGroup)),
        attribute_name: clean_text(columns.get(CanonicalField::AttributeName)),
        baseline_score: coerce_number(columns.get(CanonicalField::BaselineScore)),
        observed_score: coerce_number(columns.get(CanonicalField::ObservedScore)),
        relative_match: coerce_number(columns.get(CanonicalField::RelativeMatch)),
        group_match: coerce_number(columns.get(CanonicalField::GroupMatch)),
        final_match: coerce_number(columns.get(CanonicalField::FinalMatch)),
    }
}

/// Per-record lookup from canonical field to its best raw value.
struct CanonicalColumns<'a> {
    values: [Option<(usize, &'a Value)>; FIELD_COUNT],
}

impl<'a> CanonicalColumns<'a> {
    /// Null values are skipped. Among non-null aliases the one listed earliest
    /// in `aliases()` wins, independent of the record's key order.
    fn resolve(map: &'a Map<String, Value>) -> Self {
        let mut values: [Option<(usize, &'a Value)>; FIELD_COUNT] = [None; FIELD_COUNT];
        for (key, value) in map {
            if value.is_null() {
                continue;
            }
            if let Some((field, position)) = CanonicalField::alias_position(key) {
                let slot = &mut values[field as usize];
                if slot.map_or(true, |(best, _)| position < best) {
                    *slot = Some((position, value));
                }
            }
        }
        Self { values }
    }

    fn get(&self, field: CanonicalField) -> Option<&'a Value> {
        self.values[field as usize].map(|(_, value)| value)
    }
}

/// Lower-cases and trims a column name; inner whitespace and dashes become `_`.
pub fn normalize_column(column: &str) -> String {
    column
        .trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Display-string cleanup: null, empty, "None", "null" and "nan" all become `NOT_FOUND`.
pub fn clean_text(value: Option<&Value>) -> String {
    let text = match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => return NOT_FOUND.to_string(),
    };

    let null_like = text.is_empty()
        || ["none", "null", "nan"]
            .iter()
            .any(|marker| text.eq_ignore_ascii_case(marker));

    if null_like {
        NOT_FOUND.to_string()
    } else {
        text
    }
}

/// Permissive numeric parse; anything that is not a finite number becomes 0.0.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(0.0)
}

/// True when a cleaned display value carries real content.
pub fn is_present(text: &str) -> bool {
    text != NOT_FOUND
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_record() -> Value {
        json!({
            "employee_id": "EMP-001",
            "fullname": "Rina Wijaya",
            "position_name": "Data Analyst",
            "directorate": "Commercial",
            "grade": "IV",
            "tgv_name": "Leadership",
            "tv_name": "Competency_Drive",
            "baseline_score": 4.0,
            "user_score": "3.5",
            "tv_match_rate": 87.5,
            "tgv_match_rate": 80,
            "final_match_rate": 78.2
        })
    }

    #[test]
    fn test_full_record_maps_every_field() {
        let row = parse_match_row(&full_record());
        assert_eq!(row.subject_id, "EMP-001");
        assert_eq!(row.subject_name, "Rina Wijaya");
        assert_eq!(row.position, "Data Analyst");
        assert_eq!(row.department, "Commercial");
        assert_eq!(row.level, "IV");
        assert_eq!(row.attribute_group, "Leadership");
        assert_eq!(row.attribute_name, "Competency_Drive");
        assert_eq!(row.baseline_score, 4.0);
        assert_eq!(row.observed_score, 3.5);
        assert_eq!(row.relative_match, 87.5);
        assert_eq!(row.group_match, 80.0);
        assert_eq!(row.final_match, 78.2);
    }

    #[test]
    fn test_column_matching_ignores_case_and_whitespace() {
        let record = json!({
            "  Employee_ID ": 42,
            "FullName": "Budi",
            "Position Name": "ignored duplicate",
            "PositionName": "Manager"
        });
        let row = parse_match_row(&record);
        assert_eq!(row.subject_id, "42");
        assert_eq!(row.subject_name, "Budi");
        // `positionname` is listed before `position_name`.
        assert_eq!(row.position, "Manager");
    }

    #[test]
    fn test_alias_table_order_beats_key_order() {
        let record = json!({
            "final_score": 40,
            "final_match_rate": 75,
            "name": "Nickname",
            "fullname": "Budi Santoso",
            "subject_name": "Budi S."
        });
        let row = parse_match_row(&record);
        assert_eq!(row.final_match, 75.0);
        assert_eq!(row.subject_name, "Budi S.");
    }

    #[test]
    fn test_null_alias_does_not_shadow_filled_alias() {
        let row = parse_match_row(&json!({ "final_match_rate": null, "final_score": 80 }));
        assert_eq!(row.final_match, 80.0);

        let row = parse_match_row(&json!({ "fullname": null, "name": "Budi" }));
        assert_eq!(row.subject_name, "Budi");

        let row = parse_match_row(&json!({ "final_match": null }));
        assert_eq!(row.final_match, 0.0);
    }

    #[test]
    fn test_missing_fields_get_sentinel_and_zero() {
        let row = parse_match_row(&json!({ "employee_id": "E1" }));
        assert_eq!(row.subject_name, NOT_FOUND);
        assert_eq!(row.position, NOT_FOUND);
        assert_eq!(row.attribute_group, NOT_FOUND);
        assert_eq!(row.baseline_score, 0.0);
        assert_eq!(row.final_match, 0.0);
    }

    #[test]
    fn test_null_like_strings_become_sentinel() {
        let null_like = [
            json!(null),
            json!(""),
            json!("   "),
            json!("None"),
            json!("null"),
            json!("NaN"),
        ];
        for raw in null_like {
            assert_eq!(clean_text(Some(&raw)), NOT_FOUND, "input {raw}");
        }
        assert_eq!(clean_text(Some(&json!("  Finance "))), "Finance");
    }

    #[test]
    fn test_non_numeric_values_coerce_to_zero() {
        for raw in [
            json!("abc"),
            json!(null),
            json!(true),
            json!([1, 2]),
            json!({"v": 1}),
            json!("NaN"),
            json!("inf"),
        ] {
            assert_eq!(coerce_number(Some(&raw)), 0.0, "input {raw}");
        }
        assert_eq!(coerce_number(None), 0.0);
        assert_eq!(coerce_number(Some(&json!(" 12.5 "))), 12.5);
    }

    #[test]
    fn test_non_object_record_yields_default_row() {
        let row = parse_match_row(&json!("not a record"));
        assert_eq!(row.subject_id, NOT_FOUND);
        assert_eq!(row.observed_score, 0.0);
    }

    #[test]
    fn test_empty_input_is_empty_report() {
        let report = ingest_records(&[]);
        assert!(report.is_empty());
        assert!(report.missing_fields.is_empty());
    }

    #[test]
    fn test_schema_drift_lists_missing_fields() {
        let report = ingest_records(&[json!({
            "employee_id": "E1",
            "fullname": "A",
            "final_match_rate": 50
        })]);
        assert_eq!(report.rows.len(), 1);
        assert!(report.has_field(CanonicalField::FinalMatch));
        assert!(!report.has_field(CanonicalField::RelativeMatch));
        assert!(report.missing_fields.contains(&CanonicalField::AttributeGroup));
        assert!(!report.missing_fields.contains(&CanonicalField::SubjectId));
    }

    #[test]
    fn test_ingestion_is_idempotent() {
        let records = vec![full_record(), json!({ "EMPLOYEE_ID": "E2", "grade": null })];
        let first = ingest_records(&records);
        let second = ingest_records(&records);
        assert_eq!(first, second);

        // Canonical output fed back in is a fixed point.
        let reserialized: Vec<Value> = first
            .rows
            .iter()
            .map(|row| serde_json::to_value(row).unwrap())
            .collect();
        assert_eq!(ingest_records(&reserialized).rows, first.rows);
    }

    #[test]
    fn test_every_alias_resolves_to_its_field() {
        for field in CanonicalField::ALL {
            for alias in field.aliases() {
                assert_eq!(CanonicalField::from_column(alias), Some(field), "{alias}");
            }
            assert_eq!(CanonicalField::from_column(field.as_str()), Some(field));
        }
    }
}
