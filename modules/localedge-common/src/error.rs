use thiserror::Error;

use crate::types::FailureReason;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The only error allowed to abort a whole batch: without a session
    /// no target can proceed.
    #[error("Browser session failed to start: {0}")]
    SessionStart(String),

    #[error("Navigation timed out after {timeout_secs}s: {url}")]
    NavigationTimeout { url: String, timeout_secs: u64 },

    #[error("Navigation failed for {url}: {cause}")]
    NavigationFailed { url: String, cause: String },

    #[error("Extraction query '{query}' failed: {cause}")]
    ExtractionQueryFailed { query: String, cause: String },

    #[error("No matching selector for field '{field}'")]
    SubmissionFieldNotFound { field: String },

    #[error("No matching submit control found")]
    SubmissionSubmitNotFound,

    #[error("Batch cancelled")]
    Cancelled,

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl EngineError {
    /// Classify into the tagged-result failure taxonomy. Total: anything
    /// not otherwise classified lands in `Internal`.
    pub fn reason(&self) -> FailureReason {
        match self {
            EngineError::SessionStart(_) => FailureReason::SessionStartFailed,
            EngineError::NavigationTimeout { .. } => FailureReason::NavigationTimeout,
            EngineError::NavigationFailed { .. } => FailureReason::NavigationFailed,
            EngineError::ExtractionQueryFailed { .. } => FailureReason::ExtractionQueryFailed,
            EngineError::SubmissionFieldNotFound { .. } => FailureReason::SubmissionFieldNotFound,
            EngineError::SubmissionSubmitNotFound => FailureReason::SubmissionSubmitNotFound,
            EngineError::Cancelled => FailureReason::Cancelled,
            EngineError::Anyhow(_) => FailureReason::Internal,
        }
    }

    /// Whether this error aborts the batch instead of tagging one item.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::SessionStart(_))
    }
}
