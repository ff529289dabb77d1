//! Serving snapshot: engineered table, optional model and per-suburb scores.
//!
//! Built once and read-only afterwards. Share it behind an `Arc`; a reload
//! builds a fresh snapshot and swaps the `Arc`.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use roiscout_common::stats::{column_median, finite_values, sample_std};
use roiscout_common::{FeatureTable, Result, RoiConfig, ScoringConfig};
use roiscout_features::columns::{
    GROSS_YIELD_PCT, GROWTH_PROXY_PCT, IRSD_SCORE, MORTGAGE_MONTHLY, RENT_WEEKLY, SAL_CODE,
    SAL_NAME, TOP_QUINTILE_FLAG,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::model::ModelArtifact;

/// One suburb as seen by ranking and filtering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuburbRow {
    pub code: String,
    pub name: Option<String>,
    pub score: Option<f64>,
    /// Median monthly mortgage repayment
    pub price: Option<f64>,
    /// Median weekly rent
    pub rent: Option<f64>,
    /// IRSD score
    pub seifa_score: Option<f64>,
    pub yield_pct: Option<f64>,
    pub growth_pct: f64,
    pub top_quintile: bool,
}

impl SuburbRow {
    /// Row with only a name and score set; used to build scenarios.
    pub fn scored(name: impl Into<String>, score: f64) -> Self {
        Self {
            code: String::new(),
            name: Some(name.into()),
            score: Some(score),
            price: None,
            rent: None,
            seifa_score: None,
            yield_pct: None,
            growth_pct: 0.0,
            top_quintile: false,
        }
    }
}

/// Reference statistics for one declared model feature.
#[derive(Debug, Clone)]
pub struct FeatureStat {
    pub name: String,
    /// Whether the engineered table carries this column
    pub present: bool,
    /// Population median of finite values, 0 when there are none
    pub median: f64,
    /// Sample standard deviation, 1 when zero or undefined
    pub std: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HealthStatus {
    pub status: &'static str,
    pub suburbs_loaded: usize,
    pub model_loaded: bool,
    pub model_features: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ModelInfo {
    pub model_loaded: bool,
    pub target: Option<String>,
    pub feature_count: usize,
    pub metrics: BTreeMap<String, f64>,
    pub trained_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct Dataset {
    table: FeatureTable,
    artifact: Option<ModelArtifact>,
    feature_stats: Vec<FeatureStat>,
    rows: Vec<SuburbRow>,
    historical: Vec<f64>,
}

impl Dataset {
    /// Score every suburb in `table`, through the model when one is given
    /// and otherwise from the first configured fallback column.
    pub fn new(table: FeatureTable, artifact: Option<ModelArtifact>, scoring: &ScoringConfig) -> Self {
        let feature_stats = artifact
            .as_ref()
            .map(|a| compute_feature_stats(&table, a.features()))
            .unwrap_or_default();

        let absent: Vec<&str> = feature_stats
            .iter()
            .filter(|s| !s.present)
            .map(|s| s.name.as_str())
            .collect();
        if !absent.is_empty() {
            warn!("Model features absent from the table, fed as 0: {:?}", absent);
        }

        let scores = match &artifact {
            Some(a) => model_scores(&table, a, &feature_stats),
            None => fallback_scores(&table, &scoring.fallback_targets),
        };
        let rows = build_rows(&table, &scores);
        let historical = scores.iter().filter_map(|s| *s).collect();

        info!(
            "Dataset ready: {} suburbs, model {}",
            table.len(),
            if artifact.is_some() { "loaded" } else { "not loaded" }
        );
        Self {
            table,
            artifact,
            feature_stats,
            rows,
            historical,
        }
    }

    /// Read the engineered table and artifact named in `config`. A missing
    /// table is an error; a missing artifact is not.
    pub fn load(config: &RoiConfig) -> Result<Self> {
        let table = FeatureTable::from_csv_path(&config.data.engineered_csv, SAL_CODE, Some(SAL_NAME))?;
        let artifact = ModelArtifact::load(Path::new(&config.data.model_path));
        Ok(Self::new(table, artifact, &config.scoring))
    }

    pub fn table(&self) -> &FeatureTable {
        &self.table
    }

    pub fn artifact(&self) -> Option<&ModelArtifact> {
        self.artifact.as_ref()
    }

    pub fn rows(&self) -> &[SuburbRow] {
        &self.rows
    }

    /// Finite scores of every suburb, in table order.
    pub fn historical_scores(&self) -> &[f64] {
        &self.historical
    }

    /// Stats aligned with the artifact's declared features; empty without a model.
    pub fn feature_stats(&self) -> &[FeatureStat] {
        &self.feature_stats
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "ok",
            suburbs_loaded: self.rows.len(),
            model_loaded: self.artifact.is_some(),
            model_features: self.feature_stats.iter().filter(|s| s.present).count(),
        }
    }

    pub fn model_info(&self) -> ModelInfo {
        match &self.artifact {
            Some(a) => ModelInfo {
                model_loaded: true,
                target: Some(a.target().to_string()),
                feature_count: self.feature_stats.iter().filter(|s| s.present).count(),
                metrics: a.metrics().clone(),
                trained_at: a.trained_at(),
            },
            None => ModelInfo {
                model_loaded: false,
                target: None,
                feature_count: 0,
                metrics: BTreeMap::new(),
                trained_at: None,
            },
        }
    }
}

fn compute_feature_stats(table: &FeatureTable, features: &[String]) -> Vec<FeatureStat> {
    features
        .iter()
        .map(|name| match table.column(name) {
            Some(column) => {
                let finite = finite_values(column);
                FeatureStat {
                    name: name.clone(),
                    present: true,
                    median: column_median(column).unwrap_or(0.0),
                    std: sample_std(&finite).filter(|s| *s > 0.0).unwrap_or(1.0),
                }
            }
            None => FeatureStat {
                name: name.clone(),
                present: false,
                median: 0.0,
                std: 1.0,
            },
        })
        .collect()
}

fn model_scores(table: &FeatureTable, artifact: &ModelArtifact, stats: &[FeatureStat]) -> Vec<Option<f64>> {
    let mut input = vec![0.0; stats.len()];
    (0..table.len())
        .map(|row| {
            for (slot, stat) in stats.iter().enumerate() {
                input[slot] = if stat.present {
                    table.value(&stat.name, row).unwrap_or(stat.median)
                } else {
                    0.0
                };
            }
            Some(artifact.predict(&input)).filter(|s| s.is_finite())
        })
        .collect()
}

fn fallback_scores(table: &FeatureTable, candidates: &[String]) -> Vec<Option<f64>> {
    match candidates.iter().find(|c| table.has_column(c)) {
        Some(column) => {
            info!("Scoring from fallback column {}", column);
            (0..table.len())
                .map(|row| Some(table.value(column, row).unwrap_or(0.0)))
                .collect()
        }
        None => {
            warn!("No fallback score column among {:?}; scoring all suburbs 0", candidates);
            vec![Some(0.0); table.len()]
        }
    }
}

fn build_rows(table: &FeatureTable, scores: &[Option<f64>]) -> Vec<SuburbRow> {
    (0..table.len())
        .map(|row| SuburbRow {
            code: table.codes()[row].clone(),
            name: table.names()[row].clone(),
            score: scores[row],
            price: table.value(MORTGAGE_MONTHLY, row),
            rent: table.value(RENT_WEEKLY, row),
            seifa_score: table.value(IRSD_SCORE, row),
            yield_pct: table.value(GROSS_YIELD_PCT, row),
            growth_pct: table.value(GROWTH_PROXY_PCT, row).unwrap_or(0.0),
            top_quintile: table.value(TOP_QUINTILE_FLAG, row) == Some(1.0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinearModel;
    use roiscout_test_utils::table_from_rows;

    fn table() -> FeatureTable {
        table_from_rows(
            &["a", "b", "Realistic_ROI_Target", "ROI_Proxy_Score"],
            &[
                ("Alpha", &[1.0, 10.0, 0.4, 0.9]),
                ("Beta", &[3.0, f64::NAN, f64::NAN, 0.8]),
                ("Gamma", &[2.0, 30.0, 0.2, 0.7]),
            ],
        )
    }

    #[test]
    fn test_fallback_column_missing_values_score_zero() {
        let ds = Dataset::new(table(), None, &ScoringConfig::default());
        let scores: Vec<Option<f64>> = ds.rows().iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![Some(0.4), Some(0.0), Some(0.2)]);
        assert!(!ds.health().model_loaded);
        assert_eq!(ds.model_info().feature_count, 0);
    }

    #[test]
    fn test_model_scores_impute_median() {
        // score = b; Beta's missing b is imputed with median(10, 30) = 20
        let model = LinearModel::new(0.0, vec![0.0, 1.0]);
        let artifact = ModelArtifact::new(model, vec!["a".into(), "b".into()], "Realistic_ROI_Target");
        let ds = Dataset::new(table(), Some(artifact), &ScoringConfig::default());
        let scores: Vec<Option<f64>> = ds.rows().iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![Some(10.0), Some(20.0), Some(30.0)]);
        assert_eq!(ds.historical_scores(), &[10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_absent_feature_fed_as_zero() {
        let model = LinearModel::new(1.0, vec![1.0, 100.0]);
        let artifact = ModelArtifact::new(model, vec!["a".into(), "ghost".into()], "t");
        let ds = Dataset::new(table(), Some(artifact), &ScoringConfig::default());
        assert_eq!(ds.rows()[0].score, Some(2.0));
        assert_eq!(ds.health().model_features, 1);
        assert!(!ds.feature_stats()[1].present);
    }
}
