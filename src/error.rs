//! Error types shared by the analytics core.

use thiserror::Error;

/// Errors surfaced by the loader, simulator and prediction client.
///
/// Chart views never return these: an empty selection produces an empty
/// [`ChartData`](crate::analyzers::types::ChartData) instead.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// Unsupported file type or a row whose values cannot be parsed.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// No rows to compute a baseline or sequence from.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Prediction service unreachable or answered with an error.
    #[error("Prediction service failure: {0}")]
    ExternalServiceFailure(String),

    /// A command needs a concrete value where `All` was selected.
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AnalyticsError {
    pub fn malformed(message: impl Into<String>) -> Self {
        AnalyticsError::MalformedInput(message.into())
    }

    pub fn insufficient(message: impl Into<String>) -> Self {
        AnalyticsError::InsufficientData(message.into())
    }

    pub fn external(message: impl Into<String>) -> Self {
        AnalyticsError::ExternalServiceFailure(message.into())
    }
}

impl From<reqwest::Error> for AnalyticsError {
    fn from(e: reqwest::Error) -> Self {
        AnalyticsError::ExternalServiceFailure(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
