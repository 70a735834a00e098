//! Per-step error kinds of a translation session.

use thiserror::Error;

/// What went wrong with one pipeline step.
///
/// Only some kinds are surfaced to observers through
/// [`crate::session::Session::last_error`]; the rest are absorbed where they
/// happen and never stop the pipeline. See [`SessionError::is_surfaced`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The extractor returned a malformed hand. The frame is dropped.
    #[error("Invalid landmark count: expected {expected}, got {actual}")]
    InvalidLandmarkCount { expected: usize, actual: usize },

    /// Normalizer output did not match the classifier input size. Internal bug.
    #[error("Invalid classifier input length: expected {expected}, got {actual}")]
    InvalidInputLength { expected: usize, actual: usize },

    /// The classifier was never started or has been released.
    #[error("Classifier unavailable")]
    ClassifierUnavailable,

    /// The classifier failed or broke its output contract.
    #[error("Classifier failed: {0}")]
    ClassifierFailed(String),

    /// The winning index has no usable label. Treated as "nothing detected".
    #[error("No label for classifier output {index}")]
    ResolutionFailed { index: i64 },

    /// The result belongs to a frame admitted before the last reset.
    #[error("Stale result discarded")]
    StaleResult,

    /// The session has been torn down.
    #[error("Session closed")]
    SessionClosed,
}

impl SessionError {
    /// Whether this kind is recorded as the session's last error.
    pub fn is_surfaced(&self) -> bool {
        matches!(
            self,
            SessionError::InvalidInputLength { .. }
                | SessionError::ClassifierUnavailable
                | SessionError::ClassifierFailed(_)
        )
    }

    /// Whether this kind indicates a bug that should stop a running pipeline.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SessionError::InvalidInputLength { .. })
    }
}
