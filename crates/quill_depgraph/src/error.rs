//! Error types for reading dependency graph files.

use std::path::PathBuf;

/// Why a dependency graph file could not be read.
///
/// Every variant aborts reading that one file. Callers that only need a
/// yes/no answer go through
/// [`read_graph_from_path`](crate::format::read_graph_from_path) and fall back
/// to a full rebuild.
#[derive(Debug, thiserror::Error)]
pub enum GraphFormatError {
    /// The file could not be read.
    #[error("cannot read dependency graph {path}: {source}")]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The data ended in the middle of a field.
    #[error("unexpected end of data at bit {bit}")]
    UnexpectedEof {
        /// Bit offset where more data was needed.
        bit: usize,
    },

    /// A variable-width field encoded more than 64 bits.
    #[error("variable-width field at bit {bit} overflows 64 bits")]
    VbrOverflow {
        /// Bit offset where the field started.
        bit: usize,
    },

    /// The file does not start with the `DDEP` signature.
    #[error("missing dependency graph signature")]
    BadSignature,

    /// The signature is not followed by the record block.
    #[error("expected the record block, found abbreviation id {found}")]
    MissingBlock {
        /// The abbreviation id that was read instead.
        found: u64,
    },

    /// The record block header names an unknown block or abbreviation width.
    #[error("unsupported block header: block id {block_id}, abbreviation width {width}")]
    BadBlockHeader {
        /// Block id read from the header.
        block_id: u64,
        /// Abbreviation width read from the header.
        width: u64,
    },

    /// The declared block length runs past the end of the data.
    #[error("block declares {declared} words but only {available} remain")]
    BadBlockLength {
        /// Length from the block header, in 32-bit words.
        declared: u64,
        /// Words actually left in the data.
        available: u64,
    },

    /// Records continue past the end the block header declared.
    #[error("records run past the declared block end at bit {end_bit}")]
    BlockOverrun {
        /// Bit offset where the block should have ended.
        end_bit: usize,
    },

    /// END_BLOCK arrives before the declared block end.
    #[error("block declared to end at bit {expected_bit} but ends at bit {found_bit}")]
    BlockEndMismatch {
        /// End implied by the header's length word.
        expected_bit: usize,
        /// Where END_BLOCK, aligned, actually left off.
        found_bit: usize,
    },

    /// Bytes follow the record block.
    #[error("{bytes} trailing bytes after the record block")]
    TrailingData {
        /// How many bytes follow the block.
        bytes: usize,
    },

    /// An abbreviation id other than a record or the block end.
    #[error("unknown abbreviation id {id}")]
    UnknownAbbreviation {
        /// The offending id.
        id: u64,
    },

    /// A record id outside the known set.
    #[error("unknown record id {id}")]
    UnknownRecord {
        /// The offending id.
        id: u64,
    },

    /// The first record is not METADATA.
    #[error("first record must be METADATA, found record id {found}")]
    MissingMetadata {
        /// The record id that came first.
        found: u64,
    },

    /// The file was written by an incompatible format version.
    #[error("unsupported dependency graph format {major}.{minor}")]
    VersionMismatch {
        /// Major version in the file.
        major: u16,
        /// Minor version in the file.
        minor: u16,
    },

    /// A known record appeared where it is not allowed.
    #[error("{record} record is out of order")]
    UnexpectedRecord {
        /// Name of the misplaced record.
        record: &'static str,
    },

    /// A node's kind field is out of range.
    #[error("invalid node kind {raw}")]
    BadNodeKind {
        /// The raw 3-bit value.
        raw: u64,
    },

    /// A node's aspect field is out of range.
    #[error("invalid declaration aspect {raw}")]
    BadAspect {
        /// The raw 1-bit value.
        raw: u64,
    },

    /// A node refers to an identifier that was never defined.
    #[error("identifier index {index} out of range ({count} identifiers)")]
    BadIdentifier {
        /// The 1-based index from the node.
        index: u64,
        /// Identifiers defined so far.
        count: usize,
    },

    /// A blob that should hold text is not UTF-8.
    #[error("blob at bit {bit} is not valid UTF-8")]
    InvalidUtf8 {
        /// Bit offset of the blob's data.
        bit: usize,
    },

    /// A FINGERPRINT blob is not 32 hex digits.
    #[error("malformed fingerprint {text:?}")]
    BadFingerprint {
        /// The blob's text.
        text: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = GraphFormatError::Io {
            path: PathBuf::from("/tmp/main.deps"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("main.deps"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn version_mismatch_display() {
        let err = GraphFormatError::VersionMismatch { major: 2, minor: 0 };
        assert_eq!(err.to_string(), "unsupported dependency graph format 2.0");
    }

    #[test]
    fn identifier_display() {
        let err = GraphFormatError::BadIdentifier { index: 9, count: 3 };
        assert!(err.to_string().contains("9"));
        assert!(err.to_string().contains("3 identifiers"));
    }
}
