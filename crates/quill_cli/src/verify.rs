//! `quill verify`: check `expected-*` annotations against recorded
//! dependencies.

use std::collections::BTreeMap;
use std::path::PathBuf;

use quill_config::QuillConfig;
use quill_depgraph::{DependencyCollector, ReferencedNameTracker};
use quill_diagnostics::DiagnosticSink;
use quill_source::{FileId, SourceDb};
use quill_verify::verify_dependencies;

use crate::pipeline::{load_uses, render_diagnostics, tracker_for};
use crate::{GlobalArgs, VerifyArgs};

/// Runs the `quill verify` command.
///
/// Returns exit code 0 if every annotation matched, 1 otherwise.
pub fn run(args: &VerifyArgs, config: &QuillConfig, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let files: Vec<PathBuf> = if args.files.is_empty() {
        config.verify.files.clone()
    } else {
        args.files.clone()
    };
    if files.is_empty() {
        if !global.quiet {
            eprintln!("warning: no files to verify");
        }
        return Ok(0);
    }

    let uses = load_uses(&args.uses)?;
    let (source_db, collector, ids) = load_sources(&files, &uses)?;

    let sink = DiagnosticSink::new();
    let auto_fix = args.fix || config.verify.auto_fix;
    let had_error = verify_dependencies(&source_db, &collector, &ids, auto_fix, &sink)?;

    let errors = sink.error_count();
    let rendered = render_diagnostics(&sink, &source_db, global.color);
    if !global.quiet {
        eprintln!(
            "   Verified {} file(s): {} error(s), {} diagnostic(s)",
            ids.len(),
            errors,
            rendered
        );
        if auto_fix && had_error {
            eprintln!("   Applied suggested annotations");
        }
    }

    Ok(if had_error { 1 } else { 0 })
}

/// Loads each source once, pairing it with its recorded tracker. A path
/// listed twice is verified, and fixed, only once.
fn load_sources(
    files: &[PathBuf],
    uses: &BTreeMap<PathBuf, ReferencedNameTracker>,
) -> Result<(SourceDb, DependencyCollector, Vec<FileId>), Box<dyn std::error::Error>> {
    let mut source_db = SourceDb::new();
    let mut collector = DependencyCollector::new();
    let mut ids = Vec::with_capacity(files.len());
    for path in files {
        if source_db.file_by_path(path).is_some() {
            tracing::debug!(file = %path.display(), "listed twice; verifying once");
            continue;
        }
        let id = source_db
            .load_file(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        match tracker_for(uses, path) {
            Some(tracker) => collector.insert(id, tracker.clone()),
            None => tracing::debug!(file = %path.display(), "no recorded dependencies"),
        }
        ids.push(id);
    }
    Ok((source_db, collector, ids))
}
