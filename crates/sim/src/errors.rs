use simmlst_cov::CovError;
use thiserror::Error;

/// Errors that abort a batch.
#[derive(Debug, Error)]
pub enum SimError {
    /// Broken accumulator contract (unaligned sequences, shape mismatch).
    #[error(transparent)]
    Cov(#[from] CovError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The simulator binary could not be started.
    #[error("Failed to launch simulator '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// The simulator ran but reported failure.
    #[error("Simulator exited with {status}: {stderr}")]
    Simulator { status: String, stderr: String },

    /// The alignment file could not be parsed.
    #[error("Malformed alignment: {0}")]
    Alignment(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A worker thread died without reporting an error.
    #[error("Worker thread panicked")]
    WorkerPanic,
}
