//! Error types for dependency verification.

use quill_source::FileId;
use std::path::PathBuf;

/// A failure that stops verification of a file outright.
///
/// Mismatches between annotations and recorded dependencies are not errors
/// of this kind; they are reported as diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// The file is not loaded in the source database.
    #[error("source file {file} has no buffer")]
    UnknownFile {
        /// The missing file.
        file: FileId,
    },

    /// Two fix-its edit overlapping text.
    #[error("cannot apply overlapping fix-its at byte {offset} (previous fix-it ends at {previous_end})")]
    OverlappingFixits {
        /// Start of the later fix-it.
        offset: u32,
        /// End of the fix-it before it.
        previous_end: u32,
    },

    /// A fix-it points outside the file or into the middle of a character.
    #[error("fix-it range {start}..{end} is not valid in a {len}-byte file")]
    FixitOutOfRange {
        /// Start offset.
        start: usize,
        /// End offset.
        end: usize,
        /// File length in bytes.
        len: usize,
    },

    /// Writing the fixed file failed.
    #[error("failed to write {path}: {source}")]
    Io {
        /// The file being rewritten.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
