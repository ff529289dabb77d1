//! roiscout-common — Shared types, errors, and numeric helpers used across all roiscout crates.

pub mod error;
pub mod table;
pub mod stats;
pub mod normalise;
pub mod config;

// Re-export commonly used types
pub use error::{Result, RoiError};
pub use table::{Column, FeatureTable};
pub use config::{RoiConfig, PipelineConfig, ScoringConfig, RankingConfig, DataConfig};
