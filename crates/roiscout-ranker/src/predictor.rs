//! Score a feature vector and explain it.
//!
//! The vector starts from a named suburb (or the population medians),
//! takes any user overrides, and is fed to the artifact's regressor. The
//! explanation weights each feature's standardised distance from the
//! median by the model's importance for that feature.

use std::collections::{BTreeMap, HashMap};

use roiscout_common::stats::round_to;
use roiscout_common::{Result, RoiError};
use serde::Serialize;
use tracing::debug;

use crate::dataset::Dataset;

/// Factors kept in an explanation.
pub const MAX_FACTORS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Positive,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Signal {
    Strong,
    Moderate,
    Cautious,
}

impl Signal {
    pub fn from_percentile(percentile: f64) -> Self {
        if percentile >= 80.0 {
            Signal::Strong
        } else if percentile <= 40.0 {
            Signal::Cautious
        } else {
            Signal::Moderate
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Factor {
    pub feature: String,
    pub value: f64,
    /// Population median the value is compared against
    pub median: f64,
    pub direction: Direction,
    pub impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub suburb_name: Option<String>,
    pub score: f64,
    pub score_percent: f64,
    /// Share of suburbs scoring at or below `score`, in percent
    pub percentile: f64,
    pub signal: Signal,
    pub input_features: BTreeMap<String, f64>,
    pub factors: Vec<Factor>,
}

/// Predict for a named suburb, a hypothetical vector, or both.
///
/// Name matching is exact and case-insensitive; an unknown name falls back
/// to the population medians. Override keys that are not usable model
/// features are ignored.
pub fn predict(
    dataset: &Dataset,
    suburb_name: Option<&str>,
    overrides: &HashMap<String, f64>,
) -> Result<PredictionResult> {
    let artifact = dataset.artifact().ok_or(RoiError::ModelUnavailable)?;
    let stats = dataset.feature_stats();
    if !stats.iter().any(|s| s.present) {
        return Err(RoiError::NoUsableFeatures {
            declared: artifact.features().to_vec(),
        });
    }

    let table = dataset.table();
    let row = suburb_name.and_then(|name| table.find_by_name(name));
    if suburb_name.is_some() && row.is_none() {
        debug!("Suburb {:?} not found; using population medians", suburb_name);
    }

    // Declared order; absent features stay 0 and are not reported.
    let mut input = vec![0.0; stats.len()];
    let mut input_features = BTreeMap::new();
    for (slot, stat) in stats.iter().enumerate() {
        if !stat.present {
            continue;
        }
        let base = row
            .and_then(|r| table.value(&stat.name, r))
            .unwrap_or(stat.median);
        let value = overrides.get(&stat.name).copied().unwrap_or(base);
        let value = if value.is_finite() { value } else { 0.0 };
        input[slot] = value;
        input_features.insert(stat.name.clone(), value);
    }

    let score = artifact.predict(&input);
    let percentile = percentile_of(dataset.historical_scores(), score);

    let importances = artifact.importances();
    let mut factors: Vec<Factor> = stats
        .iter()
        .enumerate()
        .filter(|(_, stat)| stat.present)
        .map(|(slot, stat)| {
            let weight = importances.map(|imp| imp[slot]).unwrap_or(1.0);
            let impact = weight * (input[slot] - stat.median) / stat.std;
            Factor {
                feature: stat.name.clone(),
                value: input[slot],
                median: stat.median,
                direction: if impact >= 0.0 { Direction::Positive } else { Direction::Negative },
                impact,
            }
        })
        .collect();
    factors.sort_by(|a, b| b.impact.abs().total_cmp(&a.impact.abs()));
    factors.truncate(MAX_FACTORS);

    Ok(PredictionResult {
        suburb_name: suburb_name.map(str::to_string),
        score,
        score_percent: round_to(score * 100.0, 2),
        percentile: round_to(percentile, 2),
        signal: Signal::from_percentile(percentile),
        input_features,
        factors,
    })
}

/// Percent of `historical` at or below `score`; 0 for an empty history.
pub fn percentile_of(historical: &[f64], score: f64) -> f64 {
    if historical.is_empty() {
        return 0.0;
    }
    let at_or_below = historical.iter().filter(|h| **h <= score).count();
    at_or_below as f64 / historical.len() as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LinearModel, ModelArtifact};
    use roiscout_common::ScoringConfig;
    use roiscout_test_utils::table_from_rows;

    const FEATURES: [&str; 6] = ["f1", "f2", "f3", "f4", "f5", "f6"];

    fn dataset(model: LinearModel) -> Dataset {
        let table = table_from_rows(
            &FEATURES,
            &[
                ("Alpha", &[1.0, 10.0, 5.0, 0.0, 2.0, 7.0]),
                ("Beta", &[2.0, 20.0, 5.0, 1.0, 4.0, 8.0]),
                ("Gamma", &[3.0, 30.0, 5.0, 2.0, 6.0, 9.0]),
                ("Delta", &[4.0, f64::NAN, 5.0, 3.0, 8.0, 10.0]),
            ],
        );
        let artifact = ModelArtifact::new(
            model,
            FEATURES.iter().map(|f| f.to_string()).collect(),
            "Realistic_ROI_Target",
        );
        Dataset::new(table, Some(artifact), &ScoringConfig::default())
    }

    fn sum_model() -> LinearModel {
        LinearModel::new(0.0, vec![0.01; 6])
    }

    #[test]
    fn test_no_name_no_overrides_uses_medians() {
        let ds = dataset(sum_model());
        let result = predict(&ds, None, &HashMap::new()).unwrap();
        assert_eq!(result.input_features["f1"], 2.5);
        assert_eq!(result.input_features["f2"], 20.0);
        assert_eq!(result.input_features["f6"], 8.5);
        assert!(result.factors.iter().all(|f| f.impact == 0.0));
    }

    #[test]
    fn test_named_row_with_median_fallback() {
        let ds = dataset(sum_model());
        let result = predict(&ds, Some("delta"), &HashMap::new()).unwrap();
        assert_eq!(result.input_features["f1"], 4.0);
        // Delta has no f2; the median of the other rows stands in
        assert_eq!(result.input_features["f2"], 20.0);
        assert_eq!(result.suburb_name.as_deref(), Some("delta"));
    }

    #[test]
    fn test_overrides_replace_known_keys_only() {
        let ds = dataset(sum_model());
        let overrides = HashMap::from([
            ("f1".to_string(), 100.0),
            ("unknown".to_string(), 5.0),
            ("f3".to_string(), f64::INFINITY),
        ]);
        let result = predict(&ds, Some("Alpha"), &overrides).unwrap();
        assert_eq!(result.input_features["f1"], 100.0);
        assert_eq!(result.input_features["f3"], 0.0);
        assert!(!result.input_features.contains_key("unknown"));
    }

    #[test]
    fn test_attribution_capped_and_sorted() {
        let ds = dataset(sum_model());
        let overrides = HashMap::from([("f1".to_string(), 50.0), ("f4".to_string(), -20.0)]);
        let result = predict(&ds, Some("Gamma"), &overrides).unwrap();
        assert!(result.factors.len() <= MAX_FACTORS);
        for pair in result.factors.windows(2) {
            assert!(pair[0].impact.abs() >= pair[1].impact.abs());
        }
        assert_eq!(result.factors[0].feature, "f1");
        assert_eq!(result.factors[1].direction, Direction::Negative);
    }

    #[test]
    fn test_importances_weight_impacts() {
        let model = sum_model().with_importances(vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        let ds = dataset(model);
        let overrides = HashMap::from([("f1".to_string(), 1000.0)]);
        let result = predict(&ds, None, &overrides).unwrap();
        let f1 = result.factors.iter().find(|f| f.feature == "f1");
        assert!(f1.map(|f| f.impact == 0.0).unwrap_or(true));
    }

    #[test]
    fn test_constant_feature_uses_unit_std() {
        let ds = dataset(sum_model());
        let overrides = HashMap::from([("f3".to_string(), 8.0)]);
        let result = predict(&ds, None, &overrides).unwrap();
        let f3 = result.factors.iter().find(|f| f.feature == "f3").unwrap();
        assert_eq!(f3.impact, 3.0);
    }

    #[test]
    fn test_model_unavailable() {
        let table = table_from_rows(&["f1"], &[("Alpha", &[1.0])]);
        let ds = Dataset::new(table, None, &ScoringConfig::default());
        let err = predict(&ds, None, &HashMap::new()).unwrap_err();
        assert!(matches!(err, RoiError::ModelUnavailable));
    }

    #[test]
    fn test_no_usable_features() {
        let table = table_from_rows(&["f1"], &[("Alpha", &[1.0])]);
        let artifact = ModelArtifact::new(sum_model(), vec!["x".into(), "y".into()], "t");
        let ds = Dataset::new(table, Some(artifact), &ScoringConfig::default());
        match predict(&ds, None, &HashMap::new()) {
            Err(RoiError::NoUsableFeatures { declared }) => assert_eq!(declared, vec!["x", "y"]),
            other => panic!("expected NoUsableFeatures, got {:?}", other),
        }
    }

    #[test]
    fn test_percentile_and_signal() {
        assert_eq!(percentile_of(&[], 0.5), 0.0);
        assert_eq!(percentile_of(&[0.1, 0.2, 0.3, 0.4, 0.5], 0.4), 80.0);
        assert_eq!(Signal::from_percentile(80.0), Signal::Strong);
        assert_eq!(Signal::from_percentile(40.0), Signal::Cautious);
        assert_eq!(Signal::from_percentile(40.01), Signal::Moderate);
    }
}
