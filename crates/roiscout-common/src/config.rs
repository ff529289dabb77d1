//! Runtime configuration for roiscout.
//!
//! Every field carries a serde default, so an empty TOML document (or no
//! file at all) yields the documented defaults.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoiError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoiConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
}

// ── Data locations ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// SEIFA 2021 SAL table exported to CSV
    #[serde(default = "default_seifa_csv")]
    pub seifa_csv: String,
    /// Census G01 (selected person characteristics)
    #[serde(default = "default_g01_csv")]
    pub g01_csv: String,
    /// Census G02 (selected medians and averages)
    #[serde(default = "default_g02_csv")]
    pub g02_csv: String,
    /// Engineered feature table written by the pipeline
    #[serde(default = "default_engineered_csv")]
    pub engineered_csv: String,
    /// Serialized model artifact (JSON)
    #[serde(default = "default_model_path")]
    pub model_path: String,
}

fn default_seifa_csv() -> String { "abs_data/SEIFA_2021_SAL.csv".to_string() }
fn default_g01_csv() -> String { "abs_data/2021Census_G01_AUST_SAL.csv".to_string() }
fn default_g02_csv() -> String { "abs_data/2021Census_G02_AUST_SAL.csv".to_string() }
fn default_engineered_csv() -> String { "prepared_data/suburb_roi_features.csv".to_string() }
fn default_model_path() -> String { "models/roi_model.json".to_string() }

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            seifa_csv: default_seifa_csv(),
            g01_csv: default_g01_csv(),
            g02_csv: default_g02_csv(),
            engineered_csv: default_engineered_csv(),
            model_path: default_model_path(),
        }
    }
}

// ── Feature pipeline ──────────────────────────────────────────────────────────

/// Longest loan term accepted by validation.
pub const MAX_TERM_YEARS: u32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Annual mortgage interest rate used to back-solve property price
    #[serde(default = "default_annual_rate")]
    pub annual_rate: f64,
    /// Mortgage term in years
    #[serde(default = "default_term_years")]
    pub term_years: u32,
    /// Standard deviation of the market noise added to the target
    #[serde(default = "default_noise_std")]
    pub noise_std: f64,
    /// Seed of the noise generator
    #[serde(default = "default_noise_seed")]
    pub noise_seed: u64,
    #[serde(default = "default_target_floor")]
    pub target_floor: f64,
    #[serde(default = "default_target_ceiling")]
    pub target_ceiling: f64,
    /// Quantile at or above which a suburb joins the top cluster
    #[serde(default = "default_top_quantile")]
    pub top_quantile: f64,
}

fn default_annual_rate() -> f64 { 0.062 }
fn default_term_years() -> u32 { 30 }
fn default_noise_std() -> f64 { 0.035 }
fn default_noise_seed() -> u64 { 42 }
fn default_target_floor() -> f64 { 0.02 }
fn default_target_ceiling() -> f64 { 0.95 }
fn default_top_quantile() -> f64 { 0.80 }

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            annual_rate: default_annual_rate(),
            term_years: default_term_years(),
            noise_std: default_noise_std(),
            noise_seed: default_noise_seed(),
            target_floor: default_target_floor(),
            target_ceiling: default_target_ceiling(),
            top_quantile: default_top_quantile(),
        }
    }
}

// ── Scoring & ranking ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Columns read as the score when no model artifact is loaded,
    /// first present wins.
    #[serde(default = "default_fallback_targets")]
    pub fallback_targets: Vec<String>,
}

fn default_fallback_targets() -> Vec<String> {
    vec!["Realistic_ROI_Target".to_string(), "ROI_Proxy_Score".to_string()]
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { fallback_targets: default_fallback_targets() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    #[serde(default = "default_top_n")]
    pub default_top_n: usize,
}

fn default_top_n() -> usize { 20 }

impl Default for RankingConfig {
    fn default() -> Self {
        Self { default_top_n: default_top_n() }
    }
}

impl RoiConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: RoiConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let p = &self.pipeline;
        if !(p.annual_rate > 0.0) {
            return Err(RoiError::Config(format!("annual_rate must be positive, got {}", p.annual_rate)));
        }
        if p.term_years == 0 || p.term_years > MAX_TERM_YEARS {
            return Err(RoiError::Config(format!(
                "term_years must be in 1..={}, got {}",
                MAX_TERM_YEARS, p.term_years
            )));
        }
        if !(p.noise_std >= 0.0) {
            return Err(RoiError::Config(format!("noise_std must be non-negative, got {}", p.noise_std)));
        }
        if p.target_floor >= p.target_ceiling {
            return Err(RoiError::Config(format!(
                "target_floor ({}) must be below target_ceiling ({})",
                p.target_floor, p.target_ceiling
            )));
        }
        if !(p.top_quantile > 0.0 && p.top_quantile < 1.0) {
            return Err(RoiError::Config(format!("top_quantile must be in (0, 1), got {}", p.top_quantile)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = RoiConfig::from_toml_str("").unwrap();
        assert_eq!(config.pipeline.term_years, 30);
        assert!((config.pipeline.annual_rate - 0.062).abs() < 1e-12);
        assert_eq!(config.pipeline.noise_seed, 42);
        assert_eq!(config.ranking.default_top_n, 20);
        assert_eq!(config.scoring.fallback_targets[0], "Realistic_ROI_Target");
    }

    #[test]
    fn test_partial_override() {
        let config = RoiConfig::from_toml_str(
            r#"
            [pipeline]
            annual_rate = 0.05
            term_years = 25
            "#,
        )
        .unwrap();
        assert_eq!(config.pipeline.term_years, 25);
        assert!((config.pipeline.target_ceiling - 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let err = RoiConfig::from_toml_str(
            r#"
            [pipeline]
            target_floor = 0.9
            target_ceiling = 0.1
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, RoiError::Config(_)));
    }

    #[test]
    fn test_zero_rate_rejected() {
        assert!(RoiConfig::from_toml_str("[pipeline]\nannual_rate = 0.0\n").is_err());
    }

    #[test]
    fn test_term_years_bounded() {
        assert!(RoiConfig::from_toml_str("[pipeline]\nterm_years = 0\n").is_err());
        assert!(RoiConfig::from_toml_str("[pipeline]\nterm_years = 400000000\n").is_err());
        let config = RoiConfig::from_toml_str("[pipeline]\nterm_years = 100\n").unwrap();
        assert_eq!(config.pipeline.term_years, MAX_TERM_YEARS);
    }
}
