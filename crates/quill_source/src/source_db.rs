//! Central database of the source files in a compilation unit.

use crate::file_id::FileId;
use crate::location::Location;
use crate::source_file::SourceFile;
use crate::span::Span;
use std::io;
use std::path::{Path, PathBuf};

/// Owns all loaded source text and resolves spans for diagnostics.
pub struct SourceDb {
    files: Vec<SourceFile>,
}

impl SourceDb {
    /// Creates an empty source database.
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Loads a source file from the filesystem and returns its [`FileId`].
    pub fn load_file(&mut self, path: &Path) -> Result<FileId, io::Error> {
        let content = std::fs::read_to_string(path)?;
        Ok(self.add_source(path.to_path_buf(), content))
    }

    /// Adds an in-memory source file. `name` stands in for the path.
    pub fn add_source(&mut self, name: impl Into<PathBuf>, content: String) -> FileId {
        let id = FileId::from_raw(self.files.len() as u32);
        self.files.push(SourceFile::new(id, name.into(), content));
        id
    }

    /// Returns the [`SourceFile`] for the given [`FileId`].
    ///
    /// # Panics
    ///
    /// Panics if the `FileId` is invalid.
    pub fn get_file(&self, id: FileId) -> &SourceFile {
        &self.files[id.as_raw() as usize]
    }

    /// Returns the file for `id`, or `None` for foreign or dummy ids.
    pub fn try_get_file(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.as_raw() as usize)
    }

    /// Path the file was loaded from.
    pub fn path(&self, id: FileId) -> &Path {
        &self.get_file(id).path
    }

    /// Finds a loaded file by its path.
    pub fn file_by_path(&self, path: &Path) -> Option<FileId> {
        self.files.iter().find(|f| f.path == path).map(|f| f.id)
    }

    /// Every loaded file id, in load order.
    pub fn file_ids(&self) -> impl Iterator<Item = FileId> + '_ {
        self.files.iter().map(|f| f.id)
    }

    /// Replaces a file's text in memory. Returns `false` for unknown ids.
    pub fn replace_content(&mut self, id: FileId, content: String) -> bool {
        match self.files.get_mut(id.as_raw() as usize) {
            Some(file) => {
                file.replace_content(content);
                true
            }
            None => false,
        }
    }

    /// Where `span` starts, or `None` when it lies outside every loaded
    /// file.
    pub fn location(&self, span: Span) -> Option<Location> {
        let file = self.try_get_file(span.file)?;
        let (line, column) = file.line_col(span.start);
        Some(Location {
            path: file.path.clone(),
            line,
            column,
        })
    }

    /// Returns the source text corresponding to a [`Span`].
    pub fn snippet(&self, span: Span) -> &str {
        self.get_file(span.file).snippet(span.start, span.end)
    }
}

impl Default for SourceDb {
    fn default() -> Self {
        Self::new()
    }
}
