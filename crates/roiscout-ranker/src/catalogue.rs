//! Lookup views: suburb names, nearest-score search and input guidance.

use std::collections::BTreeSet;

use roiscout_common::stats::{finite_values, mean, median, quantile, round_to};
use roiscout_common::FeatureTable;
use serde::Serialize;

use crate::dataset::SuburbRow;

pub const MAX_NAMES: usize = 1000;
pub const MAX_NEAREST: usize = 50;

/// Sorted, de-duplicated suburb names, optionally narrowed to those
/// containing `query` (case-insensitive). `limit` is clamped to 1..=1000.
pub fn suburb_names(rows: &[SuburbRow], query: Option<&str>, limit: usize) -> Vec<String> {
    let needle = query.filter(|q| !q.is_empty()).map(str::to_lowercase);
    let names: BTreeSet<&str> = rows
        .iter()
        .filter_map(|r| r.name.as_deref())
        .filter(|name| match &needle {
            Some(n) => name.to_lowercase().contains(n.as_str()),
            None => true,
        })
        .collect();
    names
        .into_iter()
        .take(limit.clamp(1, MAX_NAMES))
        .map(str::to_string)
        .collect()
}

/// Rows whose score is closest to `target`. A target above 1 is read as a
/// percent. Unscored rows are skipped; `top_n` is clamped to 1..=50.
pub fn closest_to_score(rows: &[SuburbRow], target: f64, top_n: usize) -> Vec<SuburbRow> {
    let target = if target > 1.0 { target / 100.0 } else { target };
    let mut scored: Vec<(f64, &SuburbRow)> = rows
        .iter()
        .filter_map(|r| r.score.map(|s| ((s - target).abs(), r)))
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    scored
        .into_iter()
        .take(top_n.clamp(1, MAX_NEAREST))
        .map(|(_, r)| r.clone())
        .collect()
}

/// Plausible input range for one model feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureMetadata {
    pub feature: String,
    /// Observed minimum, raised to the lower Tukey fence when the IQR is positive
    pub min: f64,
    /// Observed maximum, lowered to the upper Tukey fence when the IQR is positive
    pub max: f64,
    pub median: f64,
    pub mean: f64,
}

/// Range guidance for each feature the table carries with at least one
/// finite value; others are skipped. Values are rounded to 4 decimals.
pub fn feature_metadata(table: &FeatureTable, features: &[String]) -> Vec<FeatureMetadata> {
    features
        .iter()
        .filter_map(|feature| {
            let values = finite_values(table.column(feature)?);
            let lo = values.iter().copied().reduce(f64::min)?;
            let hi = values.iter().copied().reduce(f64::max)?;
            let q1 = quantile(&values, 0.25)?;
            let q3 = quantile(&values, 0.75)?;
            let iqr = q3 - q1;
            let (min, max) = if iqr > 0.0 {
                (lo.max(q1 - 1.5 * iqr), hi.min(q3 + 1.5 * iqr))
            } else {
                (lo, hi)
            };
            Some(FeatureMetadata {
                feature: feature.clone(),
                min: round_to(min, 4),
                max: round_to(max, 4),
                median: round_to(median(&values)?, 4),
                mean: round_to(mean(&values)?, 4),
            })
        })
        .collect()
}
