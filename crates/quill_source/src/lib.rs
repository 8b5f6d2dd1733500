//! Source text and locations for the files of one compilation unit.
//!
//! The [`SourceDb`] owns every loaded file. [`FileId`] and [`Span`] name byte
//! ranges within it; a [`Location`] is what a diagnostic prints for one.
//! Dependency trackers are keyed by [`FileId`].

#![warn(missing_docs)]

pub mod file_id;
pub mod location;
pub mod source_db;
pub mod source_file;
pub mod span;

pub use file_id::FileId;
pub use location::Location;
pub use source_db::SourceDb;
pub use source_file::SourceFile;
pub use span::Span;
