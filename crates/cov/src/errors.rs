use thiserror::Error;

/// Errors raised by the accumulators when their input contract is broken.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CovError {
    /// Two sequences of one pair have different lengths.
    #[error("Sequence length mismatch: {len1} vs {len2}")]
    LengthMismatch { len1: usize, len2: usize },

    /// Two accumulators with different layouts were merged.
    #[error("Cannot merge accumulators of different shape: {left} vs {right}")]
    ShapeMismatch { left: String, right: String },

    /// `max_lag` must allow at least lag 0.
    #[error("Invalid max lag: {0} (must be at least 1)")]
    InvalidMaxLag(usize),
}
