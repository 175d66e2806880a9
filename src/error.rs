//! Error types for anomaly calibration

use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, CalibratorError>;

#[derive(Error, Debug)]
pub enum CalibratorError {
    /// Explicit injection position past the end of the signal
    #[error("position {position} is out of bounds for a signal of length {len}")]
    PositionOutOfBounds { position: usize, len: usize },

    /// A random position was requested from an empty signal
    #[error("cannot sample a position from an empty signal")]
    EmptySignal,

    #[error("invalid location range: min {min}, max {max} (need 0 <= min <= max <= 1)")]
    InvalidLocationRange { min: f64, max: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("sampling error: {0}")]
    Sampling(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("column not found: {0}")]
    MissingColumn(String),

    #[error("row {row}: cannot parse {value:?} in column {column} as a number")]
    ParseValue { column: String, row: usize, value: String },

    #[error("row {row}: cannot parse {value:?} in column {column} as a timestamp")]
    ParseDatetime { column: String, row: usize, value: String },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("failed to read .env file: {0}")]
    DotEnv(#[from] dotenvy::Error),

    #[error("plotting failed: {0}")]
    Plot(String),
}
