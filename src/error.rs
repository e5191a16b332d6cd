//! Error types for per-image analysis.
//!
//! None of these ever escape a batch: the pipeline logs them and substitutes
//! the empty result for the affected image.

use thiserror::Error;

/// Failures reported by a [`VisionPreprocessor`](crate::preprocessor::VisionPreprocessor).
#[derive(Debug, Error)]
pub enum PreprocessorError {
    #[error("preprocessing failed: {0}")]
    Failed(String),

    #[error("invalid preprocessor payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

/// Everything that can go wrong while analyzing one image.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid base64 image payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error(transparent)]
    Preprocessor(#[from] PreprocessorError),

    #[error("malformed element {index}: {reason}")]
    MalformedElement { index: usize, reason: String },

    #[error("analysis task failed: {0}")]
    TaskFailed(String),
}

impl From<tokio::task::JoinError> for AnalysisError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::TaskFailed(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failure() {
        let error = AnalysisError::MalformedElement {
            index: 3,
            reason: "negative width".to_string(),
        };
        assert_eq!(error.to_string(), "malformed element 3: negative width");

        let wrapped: AnalysisError = PreprocessorError::Failed("model offline".to_string()).into();
        assert_eq!(wrapped.to_string(), "preprocessing failed: model offline");
    }
}
