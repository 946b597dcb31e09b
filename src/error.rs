//! Error types for rule evaluation and dispatch

use thiserror::Error;

/// Errors raised while screening transactions
#[derive(Debug, Clone, Error)]
pub enum DetectionError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("worker {worker} failed evaluation: {reason}")]
    WorkerEvaluationFailure { worker: usize, reason: String },

    #[error("result channel closed after {received} of {expected} worker reports")]
    CollectionFailure { received: usize, expected: usize },
}

/// Result type for detection operations
pub type DetectionResult<T> = Result<T, DetectionError>;

impl DetectionError {
    /// Wrap any error surfaced inside a worker
    pub fn worker_failure(worker: usize, reason: impl Into<String>) -> Self {
        DetectionError::WorkerEvaluationFailure {
            worker,
            reason: reason.into(),
        }
    }
}
