//! Failures that mean Quill itself is wrong.

/// Result of setup or dispatch that can only fail through a Quill bug, such
/// as a request type no zone registered. Problems in user code travel as
/// diagnostics instead.
pub type QuillResult<T> = Result<T, InternalError>;

/// A broken internal invariant, described for the crash report.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("internal compiler error: {message}")]
pub struct InternalError {
    /// What went wrong, naming the request or zone involved.
    pub message: String,
}

impl InternalError {
    /// Reports a broken invariant.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
