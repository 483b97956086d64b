//! Chart-ready summaries of a run: final score distribution and the
//! best-matching attribute groups. Rendering is left to the client.

use serde::{Deserialize, Serialize};

use crate::talent::ingest::MatchRow;
use crate::talent::ranking::RankedSubject;

pub const DISTRIBUTION_BINS: usize = 10;
pub const TOP_GROUPS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAverage {
    pub attribute_group: String,
    pub mean_group_match: f64,
    pub row_count: usize,
}

/// Equal-width histogram of `final_score` between the observed min and max.
/// The last bin is closed on the right. A single-valued range is widened by 0.5
/// on each side.
pub fn score_distribution(subjects: &[RankedSubject], bins: usize) -> Vec<HistogramBin> {
    if subjects.is_empty() || bins == 0 {
        return Vec::new();
    }

    let (mut lo, mut hi) = subjects.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
        (lo.min(s.final_score), hi.max(s.final_score))
    });
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let mut histogram: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: lo + width * i as f64,
            upper: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for subject in subjects {
        let slot = (((subject.final_score - lo) / width).floor() as usize).min(bins - 1);
        histogram[slot].count += 1;
    }

    histogram
}

/// Mean server `group_match` per attribute group, best first, truncated to `limit`.
/// Equal means keep first-seen order.
pub fn top_group_averages(rows: &[MatchRow], limit: usize) -> Vec<GroupAverage> {
    let mut groups: Vec<(&str, f64, usize)> = Vec::new();
    for row in rows {
        let name = row.attribute_group.as_str();
        match groups.iter_mut().find(|(g, _, _)| *g == name) {
            Some((_, sum, count)) => {
                *sum += row.group_match;
                *count += 1;
            }
            None => groups.push((name, row.group_match, 1)),
        }
    }

    let mut averages: Vec<GroupAverage> = groups
        .into_iter()
        .map(|(name, sum, count)| GroupAverage {
            attribute_group: name.to_string(),
            mean_group_match: sum / count as f64,
            row_count: count,
        })
        .collect();

    averages.sort_by(|a, b| b.mean_group_match.total_cmp(&a.mean_group_match));
    averages.truncate(limit);
    averages
}
