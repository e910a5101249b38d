use thiserror::Error;

/// Domain-level errors shared across application components.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Query and candidate embeddings do not share the same length.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The requested number of matches was zero.
    #[error("invalid top-k: {0} (must be at least 1)")]
    InvalidK(usize),

    /// The embedding backend could not be loaded or refused the request.
    #[error("embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// The incoming payload missed a required field or violated invariants.
    #[error("validation error: {0}")]
    Validation(String),

    /// Input exceeded guard rails such as maximum length or count.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("storage failure: {0}")]
    Storage(String),

    /// Any other unexpected failure.
    #[error("unexpected error: {0}")]
    Other(String),
}

impl DomainError {
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::EmbeddingUnavailable(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn limit(msg: impl Into<String>) -> Self {
        Self::LimitExceeded(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_message() {
        let err = DomainError::dimension_mismatch(384, 256);
        assert_eq!(
            err.to_string(),
            "embedding dimension mismatch: expected 384, got 256"
        );
    }

    #[test]
    fn test_invalid_k_message() {
        assert!(DomainError::InvalidK(0).to_string().contains("at least 1"));
    }
}
