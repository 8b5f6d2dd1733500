//! Whether a diagnostic fails the run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A diagnostic's weight. Only errors make the verifier or a build report
/// failure; notes ride along after the error they explain.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Severity {
    /// Explains a preceding error, often carrying a fix-it.
    Note,
    /// Fails the run.
    Error,
}

impl Severity {
    /// Whether this severity fails the run.
    pub fn is_error(self) -> bool {
        matches!(self, Severity::Error)
    }

    /// The word printed before the diagnostic code.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Note => "note",
            Severity::Error => "error",
        }
    }

    /// SGR color used for the header on a terminal.
    pub(crate) fn ansi_color(self) -> &'static str {
        match self {
            Severity::Note => "36",
            Severity::Error => "31",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_errors_fail() {
        assert!(Severity::Error.is_error());
        assert!(!Severity::Note.is_error());
        assert!(Severity::Note < Severity::Error);
    }

    #[test]
    fn words_match_display() {
        for severity in [Severity::Note, Severity::Error] {
            assert_eq!(severity.to_string(), severity.as_str());
        }
    }
}
