//! Error types for request evaluation.

use quill_common::InternalError;
use quill_diagnostics::{Diagnostic, DiagnosticCode};
use quill_source::Span;

/// Why a request produced no value.
///
/// Failures are never cached, so evaluating the same request again retries
/// it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// The request depends on itself.
    #[error("circular reference evaluating {request}")]
    Cycle {
        /// Description of the request that was re-entered.
        request: String,
        /// Descriptions of the active requests, from the first occurrence of
        /// `request` to the innermost.
        stack: Vec<String>,
    },

    /// The request ran and reported a failure.
    #[error("{request} failed: {message}")]
    Failed {
        /// Name of the failing request.
        request: &'static str,
        /// What went wrong.
        message: String,
    },

    /// The evaluator was misused; a bug rather than a user error.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl RequestError {
    /// Whether this is a cycle.
    pub fn is_cycle(&self) -> bool {
        matches!(self, RequestError::Cycle { .. })
    }

    /// A diagnostic for the error, anchored at `span`.
    pub fn to_diagnostic(&self, span: Span) -> Diagnostic {
        match self {
            RequestError::Cycle { stack, .. } => {
                let mut diag = Diagnostic::error(DiagnosticCode::REQUEST_CYCLE, self.to_string(), span);
                for (depth, entry) in stack.iter().enumerate() {
                    diag = diag.with_note(format!("{depth}: {entry}"));
                }
                diag
            }
            RequestError::Failed { .. } | RequestError::Internal(_) => {
                Diagnostic::error(DiagnosticCode::REQUEST_FAILED, self.to_string(), span)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_display_names_request() {
        let err = RequestError::Cycle {
            request: "SuperclassDeclRequest(decl#1)".into(),
            stack: vec!["SuperclassDeclRequest(decl#1)".into(), "StablePathRequest(decl#1)".into()],
        };
        assert_eq!(err.to_string(), "circular reference evaluating SuperclassDeclRequest(decl#1)");
        assert!(err.is_cycle());
    }

    #[test]
    fn cycle_diagnostic_lists_stack() {
        let err = RequestError::Cycle {
            request: "A".into(),
            stack: vec!["A".into(), "B".into()],
        };
        let diag = err.to_diagnostic(Span::DUMMY);
        assert_eq!(diag.code, DiagnosticCode::REQUEST_CYCLE);
        assert_eq!(diag.notes, vec!["0: A".to_string(), "1: B".to_string()]);
    }

    #[test]
    fn internal_is_transparent() {
        let err = RequestError::from(InternalError::new("no zone registers Foo"));
        assert_eq!(err.to_string(), "internal compiler error: no zone registers Foo");
        assert_eq!(err.to_diagnostic(Span::DUMMY).code, DiagnosticCode::REQUEST_FAILED);
    }
}
