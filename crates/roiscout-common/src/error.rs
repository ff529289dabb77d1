use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoiError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Required input not found: {0}")]
    MissingInput(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Model is not available; load a model artifact first")]
    ModelUnavailable,

    #[error("No usable model features are present in the table (declared: {declared:?})")]
    NoUsableFeatures { declared: Vec<String> },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RoiError>;
