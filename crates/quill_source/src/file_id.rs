//! Opaque identifier for source files in a compilation unit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a file loaded into the [`SourceDb`](crate::SourceDb).
///
/// Ids are dense and assigned in load order, so sorting by `FileId` gives a
/// deterministic per-file iteration order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct FileId(u32);

impl FileId {
    /// Placeholder for locations that belong to no file.
    pub const DUMMY: FileId = FileId(u32::MAX);

    /// Creates a `FileId` from a raw `u32` value.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw `u32` value of this `FileId`.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::DUMMY {
            f.write_str("file#<none>")
        } else {
            write!(f, "file#{}", self.0)
        }
    }
}
