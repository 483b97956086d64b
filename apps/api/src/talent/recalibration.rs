//! Score Recalibration — blends the server's relative TV match with an absolute
//! match against an instrument ceiling.
//!
//! The relative score alone reads ~100% for anyone slightly above a weak
//! benchmark, so the value carried into aggregation is
//! `0.5 * relative + 0.5 * absolute`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::talent::ingest::MatchRow;

/// Ceiling used for competency-style attributes and anything unrecognised.
pub const DEFAULT_CEILING: f64 = 5.0;
/// Lower bound for the PAPI / IQ ceiling guessed from benchmark medians.
pub const MIN_MEDIAN_CEILING: f64 = 6.0;
/// Strengths are a presence signal.
pub const STRENGTH_CEILING: f64 = 1.0;

const RELATIVE_WEIGHT: f64 = 0.5;
const ABSOLUTE_WEIGHT: f64 = 0.5;

/// Instrument family, detected from the lower-cased attribute name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instrument {
    Competency,
    Papi,
    Iq,
    Strength,
    Other,
}

impl Instrument {
    pub fn detect(attribute_name: &str) -> Self {
        let name = attribute_name.trim().to_lowercase();
        if name.starts_with("competency") {
            Instrument::Competency
        } else if name.starts_with("papi") {
            Instrument::Papi
        } else if name.starts_with("iq") {
            Instrument::Iq
        } else if name.starts_with("strength") {
            Instrument::Strength
        } else {
            Instrument::Other
        }
    }
}

/// Recalibrated scores for one `MatchRow`, index-aligned with the input rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Recalibration {
    pub max_possible: f64,
    pub absolute_match: f64,
    pub relative_match: f64,
    pub combined_match: f64,
}

/// Ceiling for an attribute. `baseline_median` is only consulted for PAPI / IQ.
/// Always ≥ 1.0.
pub fn max_possible(attribute_name: &str, baseline_median: Option<f64>) -> f64 {
    match Instrument::detect(attribute_name) {
        Instrument::Competency | Instrument::Other => DEFAULT_CEILING,
        Instrument::Papi | Instrument::Iq => baseline_median
            .filter(|m| m.is_finite())
            .map_or(MIN_MEDIAN_CEILING, |m| m.max(MIN_MEDIAN_CEILING)),
        Instrument::Strength => STRENGTH_CEILING,
    }
}

/// `clamp(observed / ceiling, 0, 1) * 100`.
pub fn absolute_match(observed_score: f64, max_possible: f64) -> f64 {
    if max_possible <= 0.0 {
        return 0.0;
    }
    (observed_score / max_possible).clamp(0.0, 1.0) * 100.0
}

/// Relative match derived client-side when the server did not supply one.
/// A zero or negative baseline yields 0.
pub fn fallback_relative_match(observed_score: f64, baseline_score: f64) -> f64 {
    if baseline_score > 0.0 {
        (observed_score / baseline_score * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    }
}

pub fn combined_match(relative_match: f64, absolute_match: f64) -> f64 {
    (RELATIVE_WEIGHT * relative_match + ABSOLUTE_WEIGHT * absolute_match).clamp(0.0, 100.0)
}

/// Recalibrates every row.
///
/// `server_relative` says whether the scoring result carried a relative-match
/// column at all; when it did not, the fallback ratio is used for every row.
pub fn recalibrate(rows: &[MatchRow], server_relative: bool) -> Vec<Recalibration> {
    let medians = baseline_medians(rows);

    rows.iter()
        .map(|row| {
            let median = medians.get(row.attribute_name.as_str()).copied();
            let max_possible = max_possible(&row.attribute_name, median);
            let absolute_match = absolute_match(row.observed_score, max_possible);
            let relative_match = if server_relative {
                row.relative_match.clamp(0.0, 100.0)
            } else {
                fallback_relative_match(row.observed_score, row.baseline_score)
            };

            Recalibration {
                max_possible,
                absolute_match,
                relative_match,
                combined_match: combined_match(relative_match, absolute_match),
            }
        })
        .collect()
}

/// Median `baseline_score` per attribute name, only for PAPI / IQ attributes.
fn baseline_medians(rows: &[MatchRow]) -> HashMap<&str, f64> {
    let mut samples: HashMap<&str, Vec<f64>> = HashMap::new();
    for row in rows {
        if matches!(
            Instrument::detect(&row.attribute_name),
            Instrument::Papi | Instrument::Iq
        ) {
            samples
                .entry(row.attribute_name.as_str())
                .or_default()
                .push(row.baseline_score);
        }
    }

    samples
        .into_iter()
        .filter_map(|(name, values)| median(values).map(|m| (name, m)))
        .collect()
}

/// Median with the two middle values averaged for even counts.
pub fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
