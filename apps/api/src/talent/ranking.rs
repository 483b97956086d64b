//! Aggregation & Ranking — collapses per-attribute rows into one scored row per
//! subject and orders them by descending final score.
//!
//! The ranking is computed once over the full set; output windows (`TopK`) are
//! plain slices of it.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::talent::ingest::{is_present, MatchRow, NOT_FOUND};
use crate::talent::recalibration::Recalibration;

/// One ranked subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSubject {
    /// 1-based position in the full ranking.
    pub rank: usize,
    pub subject_id: String,
    pub subject_name: String,
    pub position: String,
    pub department: String,
    pub level: String,
    pub final_score: f64,
}

/// Which score feeds `final_score`.
#[derive(Debug, Clone, Copy)]
pub enum ScoreSource<'a> {
    /// Two-level mean of `combined_match`: per attribute group, then across groups.
    Recalibrated(&'a [Recalibration]),
    /// The server's `final_match`, first value per subject.
    ServerFinal,
}

/// Full ranking, best first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ranking {
    subjects: Vec<RankedSubject>,
}

impl Ranking {
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn all(&self) -> &[RankedSubject] {
        &self.subjects
    }

    /// Leading slice of the ranking; never recomputes.
    pub fn top(&self, window: TopK) -> &[RankedSubject] {
        match window {
            TopK::All => &self.subjects,
            TopK::Limit(k) => &self.subjects[..k.min(self.subjects.len())],
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output window
// ────────────────────────────────────────────────────────────────────────────

/// How many ranked subjects to present. Accepts `"all"`, a number, or a numeric string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TopKRepr", into = "String")]
pub enum TopK {
    Limit(usize),
    All,
}

impl Default for TopK {
    fn default() -> Self {
        TopK::Limit(10)
    }
}

impl fmt::Display for TopK {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopK::Limit(k) => write!(f, "{k}"),
            TopK::All => f.write_str("all"),
        }
    }
}

impl From<TopK> for String {
    fn from(value: TopK) -> Self {
        value.to_string()
    }
}

impl FromStr for TopK {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(TopK::All);
        }
        match s.parse::<usize>() {
            Ok(0) => Err("top_k must be at least 1".to_string()),
            Ok(k) => Ok(TopK::Limit(k)),
            Err(_) => Err(format!("top_k must be a positive number or 'all', got '{s}'")),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TopKRepr {
    Number(usize),
    Text(String),
}

impl TryFrom<TopKRepr> for TopK {
    type Error = String;

    fn try_from(value: TopKRepr) -> Result<Self, Self::Error> {
        match value {
            TopKRepr::Number(n) => n.to_string().parse(),
            TopKRepr::Text(s) => s.parse(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Aggregation
// ────────────────────────────────────────────────────────────────────────────

/// Per-subject accumulator. Descriptive fields keep the first present value.
struct SubjectAccumulator<'a> {
    subject_id: &'a str,
    subject_name: Option<&'a str>,
    position: Option<&'a str>,
    department: Option<&'a str>,
    level: Option<&'a str>,
    first_final: f64,
    /// (attribute group, sum, count) in first-seen order.
    groups: Vec<(&'a str, f64, usize)>,
}

impl<'a> SubjectAccumulator<'a> {
    fn new(row: &'a MatchRow) -> Self {
        Self {
            subject_id: &row.subject_id,
            subject_name: None,
            position: None,
            department: None,
            level: None,
            first_final: row.final_match,
            groups: Vec::new(),
        }
    }

    fn absorb(&mut self, row: &'a MatchRow, combined: Option<f64>) {
        fill_first(&mut self.subject_name, &row.subject_name);
        fill_first(&mut self.position, &row.position);
        fill_first(&mut self.department, &row.department);
        fill_first(&mut self.level, &row.level);

        if let Some(score) = combined {
            let group = row.attribute_group.as_str();
            match self.groups.iter_mut().find(|(name, _, _)| *name == group) {
                Some((_, sum, count)) => {
                    *sum += score;
                    *count += 1;
                }
                None => self.groups.push((group, score, 1)),
            }
        }
    }

    fn final_score(&self, source: ScoreSource<'_>) -> f64 {
        match source {
            ScoreSource::ServerFinal => self.first_final,
            ScoreSource::Recalibrated(_) => {
                if self.groups.is_empty() {
                    return 0.0;
                }
                let group_means: f64 = self
                    .groups
                    .iter()
                    .map(|(_, sum, count)| sum / *count as f64)
                    .sum();
                group_means / self.groups.len() as f64
            }
        }
    }

    fn into_subject(self, final_score: f64) -> RankedSubject {
        let text = |value: Option<&str>| value.unwrap_or(NOT_FOUND).to_string();
        RankedSubject {
            rank: 0,
            subject_id: self.subject_id.to_string(),
            subject_name: text(self.subject_name),
            position: text(self.position),
            department: text(self.department),
            level: text(self.level),
            final_score,
        }
    }
}

fn fill_first<'a>(slot: &mut Option<&'a str>, value: &'a str) {
    if slot.is_none() && is_present(value) {
        *slot = Some(value);
    }
}

/// Aggregates rows into one `RankedSubject` per distinct `subject_id`, ranked by
/// descending `final_score`. Ties keep first-seen input order.
///
/// With `ScoreSource::Recalibrated`, the slice must be index-aligned with `rows`;
/// rows beyond its length contribute no score.
pub fn rank_subjects(rows: &[MatchRow], source: ScoreSource<'_>) -> Ranking {
    let mut order: Vec<SubjectAccumulator<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for (i, row) in rows.iter().enumerate() {
        let combined = match source {
            ScoreSource::Recalibrated(scores) => scores.get(i).map(|r| r.combined_match),
            ScoreSource::ServerFinal => None,
        };

        let slot = *index.entry(row.subject_id.as_str()).or_insert_with(|| {
            order.push(SubjectAccumulator::new(row));
            order.len() - 1
        });
        order[slot].absorb(row, combined);
    }

    let mut subjects: Vec<RankedSubject> = order
        .into_iter()
        .map(|acc| {
            // `+ 0.0` folds -0.0 into 0.0 so total_cmp treats them as a tie.
            let score = acc.final_score(source) + 0.0;
            acc.into_subject(score)
        })
        .collect();

    // Stable: equal scores keep ingestion order.
    subjects.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
    for (position, subject) in subjects.iter_mut().enumerate() {
        subject.rank = position + 1;
    }

    Ranking { subjects }
}
