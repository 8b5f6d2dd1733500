//! Dependency graphs for incremental compilation.
//!
//! Per-file [`ReferencedNameTracker`]s record what each source file provides
//! and uses. At the end of a build they are folded into a
//! [`ModuleDepGraph`], persisted with [`write_graph_to_path`], and read back
//! by the next build, which diffs the two graphs and walks an
//! [`InvalidationGraph`] to decide which files to recompile.

#![warn(missing_docs)]

pub mod bitstream;
pub mod diff;
pub mod error;
pub mod format;
pub mod graph;
pub mod invalidation;
pub mod key;
pub mod session;
pub mod tracker;

pub use diff::GraphChangeSet;
pub use error::GraphFormatError;
pub use format::{
    read_graph, read_graph_from_path, try_read_graph_from_path, write_graph, write_graph_to_path,
    FORMAT_MAJOR, FORMAT_MINOR,
};
pub use graph::{ModuleDepGraph, ModuleDepGraphNode};
pub use invalidation::InvalidationGraph;
pub use key::{DeclAspect, DependencyKey, NodeKind};
pub use session::{IncrementalSession, RebuildPlan};
pub use tracker::{DependencyCollector, ReferencedNameTracker};
