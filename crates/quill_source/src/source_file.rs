//! A loaded source file with a line index.

use crate::file_id::FileId;
use crate::span::Span;
use std::path::PathBuf;

/// One source file of the compilation unit.
pub struct SourceFile {
    /// The file's id within its [`SourceDb`](crate::SourceDb).
    pub id: FileId,
    /// Path on disk, or a synthetic name for in-memory sources.
    pub path: PathBuf,
    /// The full text content of the file.
    pub content: String,
    /// Byte offsets of each line start (the first entry is always 0).
    line_starts: Vec<u32>,
}

impl SourceFile {
    /// Creates a `SourceFile` and indexes its lines.
    pub fn new(id: FileId, path: PathBuf, content: String) -> Self {
        let line_starts = compute_line_starts(&content);
        Self {
            id,
            path,
            content,
            line_starts,
        }
    }

    /// Swaps in new text, e.g. after fix-its were applied.
    pub fn replace_content(&mut self, content: String) {
        self.line_starts = compute_line_starts(&content);
        self.content = content;
    }

    /// Converts a byte offset into 1-indexed (line, column) coordinates.
    pub fn line_col(&self, byte_offset: u32) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&byte_offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        let line = (line_idx as u32) + 1;
        let col = byte_offset - self.line_starts[line_idx] + 1;
        (line, col)
    }

    /// Returns the text between two byte offsets.
    pub fn snippet(&self, start: u32, end: u32) -> &str {
        &self.content[start as usize..end as usize]
    }

    /// An insertion point just past the last byte of the file.
    pub fn end_span(&self) -> Span {
        Span::point(self.id, self.content.len() as u32)
    }
}

fn compute_line_starts(content: &str) -> Vec<u32> {
    std::iter::once(0)
        .chain(content.match_indices('\n').map(|(i, _)| (i + 1) as u32))
        .collect()
}
