//! Error types for text analysis.

use thiserror::Error;

/// Result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid narration duration: {0}")]
    InvalidDuration(f64),

    #[error("Language model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Tokenization failed: {0}")]
    Tokenization(String),
}

impl AnalysisError {
    pub fn model_unavailable(msg: impl Into<String>) -> Self {
        Self::ModelUnavailable(msg.into())
    }

    pub fn tokenization(msg: impl Into<String>) -> Self {
        Self::Tokenization(msg.into())
    }
}
