//! Regressor abstraction and the model artifact bundle.
//!
//! Training happens elsewhere; this crate only needs `predict` and, when
//! the model has one, a per-feature importance vector. Two serialisable
//! regressors cover the artifacts produced today (linear and tree
//! ensemble). Anything else can be plugged in through [`Regressor`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use roiscout_common::{Result, RoiError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A fitted regression model.
///
/// Implementations must be safe to share across threads: the serving
/// snapshot hands the same model to every caller.
pub trait Regressor: Send + Sync {
    /// Score one ordered feature vector.
    fn predict(&self, features: &[f64]) -> f64;

    /// Relative importance per feature, in input order, when the model
    /// exposes one.
    fn feature_importances(&self) -> Option<&[f64]> {
        None
    }
}

// ── Linear ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_importances: Option<Vec<f64>>,
}

impl LinearModel {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            intercept,
            coefficients,
            feature_importances: None,
        }
    }

    pub fn with_importances(mut self, importances: Vec<f64>) -> Self {
        self.feature_importances = Some(importances);
        self
    }
}

impl Regressor for LinearModel {
    fn predict(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        self.feature_importances.as_deref()
    }
}

// ── Tree ensemble ─────────────────────────────────────────────────────────────

/// Regression tree node. A sample goes left when `x[feature] <= threshold`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Leaf {
        leaf: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    pub fn predict(&self, features: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { leaf } => return *leaf,
                TreeNode::Split { feature, threshold, left, right } => {
                    let x = features.get(*feature).copied().unwrap_or(0.0);
                    node = if x <= *threshold { &**left } else { &**right };
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestModel {
    pub trees: Vec<TreeNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_importances: Option<Vec<f64>>,
}

impl Regressor for ForestModel {
    /// Mean prediction over all trees; 0 for an empty forest.
    fn predict(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let total: f64 = self.trees.iter().map(|t| t.predict(features)).sum();
        total / self.trees.len() as f64
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        self.feature_importances.as_deref()
    }
}

/// Serialised form of the supported regressors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressorModel {
    Linear(LinearModel),
    Forest(ForestModel),
}

impl Regressor for RegressorModel {
    fn predict(&self, features: &[f64]) -> f64 {
        match self {
            RegressorModel::Linear(m) => m.predict(features),
            RegressorModel::Forest(m) => m.predict(features),
        }
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        match self {
            RegressorModel::Linear(m) => m.feature_importances(),
            RegressorModel::Forest(m) => m.feature_importances(),
        }
    }
}

// ── Artifact ──────────────────────────────────────────────────────────────────

pub const DEFAULT_TARGET: &str = "Realistic_ROI_Target";

#[derive(Debug, Deserialize)]
struct ArtifactFile {
    model: RegressorModel,
    features: Vec<String>,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    metrics: BTreeMap<String, f64>,
    #[serde(default)]
    trained_at: Option<DateTime<Utc>>,
}

/// Immutable bundle of a fitted regressor and the metadata needed to feed
/// it: ordered feature names, target name and evaluation metrics.
#[derive(Clone)]
pub struct ModelArtifact {
    regressor: Arc<dyn Regressor>,
    features: Vec<String>,
    target: String,
    metrics: BTreeMap<String, f64>,
    trained_at: Option<DateTime<Utc>>,
}

impl fmt::Debug for ModelArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelArtifact")
            .field("features", &self.features)
            .field("target", &self.target)
            .field("metrics", &self.metrics)
            .field("trained_at", &self.trained_at)
            .finish_non_exhaustive()
    }
}

impl ModelArtifact {
    pub fn new<R: Regressor + 'static>(regressor: R, features: Vec<String>, target: impl Into<String>) -> Self {
        Self {
            regressor: Arc::new(regressor),
            features,
            target: target.into(),
            metrics: BTreeMap::new(),
            trained_at: None,
        }
    }

    pub fn with_metrics(mut self, metrics: BTreeMap<String, f64>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let file: ArtifactFile = serde_json::from_str(content)?;
        if file.features.is_empty() {
            return Err(RoiError::Schema("model artifact declares no features".to_string()));
        }
        Ok(Self {
            regressor: Arc::new(file.model),
            features: file.features,
            target: file.target.unwrap_or_else(|| DEFAULT_TARGET.to_string()),
            metrics: file.metrics,
            trained_at: file.trained_at,
        })
    }

    /// Load an artifact from disk. A missing or unreadable artifact is not
    /// an error: the caller falls back to a precomputed score column.
    pub fn load(path: &Path) -> Option<Self> {
        if !path.exists() {
            info!("No model artifact at {:?}; using fallback scores", path);
            return None;
        }
        let loaded = std::fs::read_to_string(path)
            .map_err(RoiError::from)
            .and_then(|content| Self::from_json(&content));
        match loaded {
            Ok(artifact) => {
                info!(
                    "Loaded model artifact from {:?}: {} features, target {}",
                    path,
                    artifact.features.len(),
                    artifact.target
                );
                Some(artifact)
            }
            Err(e) => {
                warn!("Ignoring model artifact at {:?}: {}", path, e);
                None
            }
        }
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn metrics(&self) -> &BTreeMap<String, f64> {
        &self.metrics
    }

    pub fn trained_at(&self) -> Option<DateTime<Utc>> {
        self.trained_at
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        self.regressor.predict(features)
    }

    /// Importances aligned with [`features`](Self::features). A vector of
    /// the wrong length is treated as absent.
    pub fn importances(&self) -> Option<&[f64]> {
        self.regressor
            .feature_importances()
            .filter(|imp| imp.len() == self.features.len())
    }
}
