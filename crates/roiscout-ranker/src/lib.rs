//! roiscout-ranker — Model-backed scoring, explanation and opportunity ranking.
//!
//! A [`Dataset`] is the serving snapshot: the engineered feature table, the
//! optional [`ModelArtifact`] and one score per suburb. [`predictor`]
//! scores observed or hypothetical feature vectors and explains them;
//! [`ranking`] filters, sorts and tags suburbs; [`catalogue`] provides the
//! lookup views around them.

pub mod model;
pub mod dataset;
pub mod predictor;
pub mod ranking;
pub mod catalogue;

pub use dataset::{Dataset, HealthStatus, ModelInfo, SuburbRow};
pub use model::{ModelArtifact, Regressor, RegressorModel};
pub use predictor::{predict, Direction, Factor, PredictionResult, Signal};
pub use ranking::{
    filter, rank_opportunities, FilterQuery, InsightTag, OpportunityRow, RankingResult, Summary,
    TagThresholds,
};
