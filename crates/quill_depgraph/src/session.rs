//! Incremental session orchestration.
//!
//! An [`IncrementalSession`] loads the graph persisted by the previous build,
//! compares it with the graph of the current build, decides which files must
//! be recompiled, and persists the new graph. Loading is fail-safe: a
//! missing, corrupt, or incompatible file means every file is stale.

use crate::diff::GraphChangeSet;
use crate::format::{read_graph_from_path, write_graph_to_path};
use crate::graph::ModuleDepGraph;
use crate::invalidation::InvalidationGraph;
use quill_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use quill_source::Span;
use std::path::{Path, PathBuf};

/// File extension of persisted graphs.
const GRAPH_EXT: &str = "deps";

/// What the current build has to redo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildPlan {
    /// Differences in provided facts since the previous build.
    pub changes: GraphChangeSet,
    /// Files to recompile, sorted.
    pub files_to_recompile: Vec<String>,
    /// Set when the previous graph was unusable.
    pub full_rebuild: bool,
}

/// Ties a persisted graph to the build that produces its successor.
pub struct IncrementalSession {
    path: PathBuf,
    compiler_version: String,
    previous: ModuleDepGraph,
    current: Option<ModuleDepGraph>,
    assume_all_stale: bool,
}

impl IncrementalSession {
    /// Where the graph for `module` lives inside `deps_dir`.
    pub fn graph_path(deps_dir: &Path, module: &str) -> PathBuf {
        deps_dir.join(format!("{module}.{GRAPH_EXT}"))
    }

    /// Loads the graph at `path`, or starts from an empty one with every
    /// file considered stale.
    pub fn load_or_fresh(path: &Path, compiler_version: &str) -> Self {
        let mut previous = ModuleDepGraph::new();
        let loaded = read_graph_from_path(path, &mut previous);
        if loaded {
            tracing::debug!(path = %path.display(), nodes = previous.node_count(), "loaded previous dependency graph");
        } else {
            tracing::info!(path = %path.display(), "no usable dependency graph; rebuilding everything");
        }
        Self {
            path: path.to_path_buf(),
            compiler_version: compiler_version.to_string(),
            previous,
            current: None,
            assume_all_stale: !loaded,
        }
    }

    /// The graph from the previous build.
    pub fn previous(&self) -> &ModuleDepGraph {
        &self.previous
    }

    /// Whether the previous graph was unusable.
    pub fn assume_all_stale(&self) -> bool {
        self.assume_all_stale
    }

    /// Path the graph is loaded from and saved to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Takes the current build's graph and plans the rebuild against the
    /// previous one.
    pub fn record(&mut self, graph: ModuleDepGraph) -> RebuildPlan {
        let changes = GraphChangeSet::between(&self.previous, &graph);
        let files_to_recompile = if self.assume_all_stale {
            graph.source_files().into_iter().map(str::to_string).collect()
        } else {
            InvalidationGraph::build(&graph).files_to_recompile(&changes)
        };
        tracing::debug!(
            dirty_keys = changes.dirty_count(),
            files = files_to_recompile.len(),
            full = self.assume_all_stale,
            "planned rebuild"
        );
        self.current = Some(graph);
        RebuildPlan {
            changes,
            files_to_recompile,
            full_rebuild: self.assume_all_stale,
        }
    }

    /// Persists the recorded graph, or the previous one if nothing was
    /// recorded. Failures are reported through `sink`.
    pub fn save(&self, sink: &DiagnosticSink) -> bool {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(parent) {
                sink.emit(Diagnostic::error(
                    DiagnosticCode::GRAPH_WRITE_FAILED,
                    format!("cannot create {}: {e}", parent.display()),
                    Span::DUMMY,
                ));
                return false;
            }
        }
        let graph = self.current.as_ref().unwrap_or(&self.previous);
        write_graph_to_path(sink, &self.path, graph, &self.compiler_version)
    }
}
