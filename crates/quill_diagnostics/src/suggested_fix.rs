//! Auto-applicable fix suggestions.

use quill_source::Span;
use serde::{Deserialize, Serialize};

/// Replace the text under `span` with `new_text`. An empty span inserts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    /// The source span to replace.
    pub span: Span,
    /// The new text to insert in place of the span.
    pub new_text: String,
}

/// A described set of replacements that together implement one fix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedFix {
    /// A description of what this fix does.
    pub message: String,
    /// The set of text replacements that implement this fix.
    pub replacements: Vec<Replacement>,
}

impl SuggestedFix {
    /// A fix that inserts `text` at the start of `at`.
    pub fn insert(message: impl Into<String>, at: Span, text: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            replacements: vec![Replacement {
                span: Span::new(at.file, at.start, at.start),
                new_text: text.into(),
            }],
        }
    }
}
