//! Human-facing positions.

use std::fmt;
use std::path::PathBuf;

/// Where a span starts, as `path:line:column` with both numbers counted
/// from 1. This is the form verifier output and editors agree on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// The file's path as it was loaded.
    pub path: PathBuf,
    /// Line of the span's first byte.
    pub line: u32,
    /// Column of the span's first byte, in bytes.
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.path.display(), self.line, self.column)
    }
}
