//! Error types for the sentiment-trend library.

use thiserror::Error;

/// Result type alias for trend analysis operations.
pub type Result<T> = std::result::Result<T, TrendError>;

/// Errors that can occur while configuring or exporting a trend analysis.
///
/// Numeric edge cases (too few samples, zero variance) are not errors: the
/// detectors simply report fewer change points.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrendError {
    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A window width that could not be parsed.
    #[error("invalid window width: {0}")]
    InvalidWindow(String),

    /// A configuration document that could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization failed at the output boundary.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for TrendError {
    fn from(err: serde_json::Error) -> Self {
        TrendError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for TrendError {
    fn from(err: toml::de::Error) -> Self {
        TrendError::Config(err.to_string())
    }
}
