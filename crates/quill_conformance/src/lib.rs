//! Fixtures for end-to-end tests of the Quill incremental pipeline.
//!
//! A [`Project`] pairs source text with the declarations written in it. A
//! [`Build`] evaluates requests against the project the way one frontend job
//! would, then hands back the per-file trackers and the module dependency
//! graph they produce, ready to persist or verify.

#![warn(missing_docs)]

use std::path::Path;
use std::sync::Arc;

use quill_ast::{AstContext, DeclId};
use quill_common::{Ident, QuillResult};
use quill_depgraph::{DependencyCollector, ModuleDepGraph};
use quill_diagnostics::{Diagnostic, DiagnosticSink};
use quill_evaluator::requests::{
    ast_zone, frontend_zone, name_lookup_zone, AnyObjectLookupRequest, DirectLookupRequest,
    ExtendedNominalRequest, LookupInModuleRequest, ProvidesForFileRequest, UnqualifiedLookupRequest,
};
use quill_evaluator::{
    ActiveSource, CacheKind, DependencySource, Evaluator, Request, RequestError, RequestRegistry,
};
use quill_source::{FileId, SourceDb};
use quill_verify::{verify_dependencies, VerifyError};

/// Evaluates `request` with `file` as the active dependency source.
///
/// Sink-only lookups record nothing unless some enclosing request names the
/// file they are attributed to; this wrapper plays the part of the
/// type-checking request a real frontend would be running.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InFile<R> {
    /// The file the uses are attributed to.
    pub file: FileId,
    /// Whether the uses cascade.
    pub cascades: bool,
    /// The wrapped request.
    pub request: R,
}

impl<R: Request> Request for InFile<R> {
    type Output = R::Output;
    const NAME: &'static str = "InFile";
    const CACHING: CacheKind = CacheKind::Uncached;

    fn evaluate(&self, ev: &mut Evaluator) -> Result<R::Output, RequestError> {
        ev.evaluate(self.request.clone())
    }

    fn as_source(&self) -> Option<&dyn DependencySource> {
        Some(self)
    }
}

impl<R> DependencySource for InFile<R> {
    fn read_dependency_source(&self, _ev: &Evaluator) -> Option<ActiveSource> {
        Some(ActiveSource {
            file: self.file,
            cascades: self.cascades,
        })
    }
}

/// The built-in zones, with [`InFile`] registered for every lookup that
/// needs an active source.
pub fn registry() -> QuillResult<RequestRegistry> {
    RequestRegistry::new()
        .with_zone(ast_zone())?
        .with_zone(name_lookup_zone())?
        .with_zone(
            frontend_zone()
                .register::<InFile<UnqualifiedLookupRequest>>()
                .register::<InFile<DirectLookupRequest>>()
                .register::<InFile<LookupInModuleRequest>>()
                .register::<InFile<AnyObjectLookupRequest>>()
                .register::<InFile<ExtendedNominalRequest>>(),
        )
}

/// Name of the graph file a source file's facts are recorded under:
/// `main.swift` becomes `main.deps`.
pub fn deps_name(path: &Path) -> String {
    let stem = path.file_stem().map_or_else(|| path.to_string_lossy(), |s| s.to_string_lossy());
    format!("{stem}.deps")
}

/// Sources and declarations of one module.
pub struct Project {
    /// The source text of every file.
    pub db: SourceDb,
    /// Declarations written in those files.
    pub ast: AstContext,
    module: DeclId,
}

impl Project {
    /// Creates an empty module named `module`.
    pub fn new(module: &str) -> Self {
        let mut ast = AstContext::new();
        let module = ast.add_module(module);
        Self {
            db: SourceDb::new(),
            ast,
            module,
        }
    }

    /// The module declaration.
    pub fn module(&self) -> DeclId {
        self.module
    }

    /// Adds a source file to the module.
    pub fn add_file(&mut self, name: &str, text: &str) -> FileId {
        let file = self.db.add_source(name, text.to_string());
        self.ast.add_file(file, self.module);
        file
    }

    /// Freezes the declarations and starts a build over them.
    pub fn start_build(self) -> QuillResult<Build> {
        let ev = Evaluator::new(registry()?, Arc::new(self.ast));
        Ok(Build { db: self.db, ev })
    }
}

/// One frontend job over a [`Project`].
pub struct Build {
    db: SourceDb,
    ev: Evaluator,
}

impl Build {
    /// The evaluator, for requests that establish their own source.
    pub fn evaluator(&mut self) -> &mut Evaluator {
        &mut self.ev
    }

    /// Interns `name` in the project's identifier table.
    pub fn ident(&self, name: &str) -> Ident {
        self.ev.ast().intern(name)
    }

    /// Records the provided names of every file.
    pub fn record_provides(&mut self) -> Result<(), RequestError> {
        let files: Vec<FileId> = self.db.file_ids().collect();
        for file in files {
            self.ev.evaluate(ProvidesForFileRequest(file))?;
        }
        Ok(())
    }

    /// Evaluates `request` with its uses attributed to `file`. `R` must be
    /// one of the lookups [`registry`] wraps.
    pub fn use_in<R: Request>(&mut self, file: FileId, cascades: bool, request: R) -> Result<R::Output, RequestError> {
        self.ev.evaluate(InFile { file, cascades, request })
    }

    /// Ends the job, building the module graph from what was recorded.
    pub fn finish(mut self) -> BuildOutput {
        let collector = self.ev.take_trackers();
        let mut graph = ModuleDepGraph::new();
        for (file, tracker) in collector.iter() {
            graph.add_source_file(&deps_name(self.db.path(file)), tracker);
        }
        BuildOutput {
            db: self.db,
            collector,
            graph,
        }
    }
}

/// What a finished [`Build`] leaves behind.
pub struct BuildOutput {
    /// The project's sources.
    pub db: SourceDb,
    /// Dependencies recorded per file.
    pub collector: DependencyCollector,
    /// The module graph built from `collector`.
    pub graph: ModuleDepGraph,
}

impl BuildOutput {
    /// Checks every file's `expected-*` annotations against what was
    /// recorded. Returns whether anything failed, and the diagnostics in
    /// location order.
    pub fn verify(&self, auto_fix: bool) -> Result<(bool, Vec<Diagnostic>), VerifyError> {
        let files: Vec<FileId> = self.db.file_ids().collect();
        let sink = DiagnosticSink::new();
        let had_error = verify_dependencies(&self.db, &self.collector, &files, auto_fix, &sink)?;
        Ok((had_error, sink.take_sorted()))
    }
}
