//! Byte-offset ranges within source files.

use crate::file_id::FileId;
use serde::{Deserialize, Serialize};

/// A half-open byte range `[start, end)` within one source file.
///
/// Spans order by file, then start, then end, which is the order diagnostics
/// are reported in.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct Span {
    /// The source file this span belongs to.
    pub file: FileId,
    /// Byte offset of the start of the span (inclusive).
    pub start: u32,
    /// Byte offset of the end of the span (exclusive).
    pub end: u32,
}

impl Span {
    /// Placeholder for diagnostics with no source location.
    pub const DUMMY: Span = Span {
        file: FileId::DUMMY,
        start: 0,
        end: 0,
    };

    /// Creates a new span in the given file with the given byte range.
    pub fn new(file: FileId, start: u32, end: u32) -> Self {
        Self { file, start, end }
    }

    /// An empty span at `offset`, used as an insertion point.
    pub fn point(file: FileId, offset: u32) -> Self {
        Self::new(file, offset, offset)
    }

    /// Whether the two spans share at least one byte, or an insertion point
    /// lands strictly inside the other span.
    pub fn overlaps(&self, other: &Span) -> bool {
        if self.file != other.file {
            return false;
        }
        if self.is_empty() || other.is_empty() {
            let (point, range) = if self.is_empty() { (self, other) } else { (other, self) };
            return range.start < point.start && point.start < range.end;
        }
        self.start < other.end && other.start < self.end
    }

    /// Returns the length of this span in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns `true` if this span has zero length.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if this is the dummy span.
    pub fn is_dummy(&self) -> bool {
        self.file == FileId::DUMMY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file() -> FileId {
        FileId::from_raw(0)
    }

    #[test]
    fn point_is_empty() {
        let p = Span::point(file(), 40);
        assert!(p.is_empty());
        assert_eq!(p.len(), 0);
    }

    #[test]
    fn overlapping_ranges() {
        let a = Span::new(file(), 0, 10);
        assert!(a.overlaps(&Span::new(file(), 9, 12)));
        assert!(!a.overlaps(&Span::new(file(), 10, 12)));
        assert!(!a.overlaps(&Span::new(FileId::from_raw(1), 0, 10)));
    }

    #[test]
    fn insertion_points() {
        let a = Span::new(file(), 0, 10);
        assert!(a.overlaps(&Span::point(file(), 5)));
        assert!(!a.overlaps(&Span::point(file(), 10)));
        assert!(!Span::point(file(), 3).overlaps(&Span::point(file(), 3)));
    }

    #[test]
    fn ordering_is_by_location() {
        let mut spans = vec![
            Span::new(FileId::from_raw(1), 0, 1),
            Span::new(file(), 20, 21),
            Span::new(file(), 3, 9),
        ];
        spans.sort();
        assert_eq!(spans[0].start, 3);
        assert_eq!(spans[1].start, 20);
        assert_eq!(spans[2].file, FileId::from_raw(1));
    }

    #[test]
    fn dummy_span() {
        assert!(Span::DUMMY.is_dummy());
        assert!(!Span::point(file(), 0).is_dummy());
    }

    #[test]
    fn serde_roundtrip() {
        let s = Span::new(FileId::from_raw(1), 10, 20);
        let json = serde_json::to_string(&s).unwrap();
        let back: Span = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
