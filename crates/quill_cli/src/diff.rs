//! `quill diff`: compare two dependency graphs.
//!
//! The old graph is loaded the way an incremental build loads its
//! predecessor, so a missing or unreadable file plans a full rebuild. The new
//! graph must be readable.

use quill_config::QuillConfig;
use quill_depgraph::{try_read_graph_from_path, IncrementalSession, RebuildPlan};
use serde::Serialize;

use crate::{DiffArgs, GlobalArgs, ReportFormat};

#[derive(Serialize)]
struct DiffReport<'a> {
    full_rebuild: bool,
    added: Vec<String>,
    removed: Vec<String>,
    changed: Vec<String>,
    files_to_recompile: &'a [String],
}

/// Runs the `quill diff` command. Exits with 0 when nothing needs
/// recompiling and 1 otherwise.
pub fn run(args: &DiffArgs, config: &QuillConfig, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let new = try_read_graph_from_path(&args.new)?;
    let mut session = IncrementalSession::load_or_fresh(&args.old, &config.incremental.compiler_version);
    if session.assume_all_stale() && !global.quiet {
        eprintln!("warning: {} is not a usable graph; everything is stale", args.old.display());
    }
    let plan = session.record(new);

    match args.format {
        ReportFormat::Text => print!("{}", render_text(&plan)),
        ReportFormat::Json => println!("{}", render_json(&plan)?),
    }
    Ok(if plan.files_to_recompile.is_empty() { 0 } else { 1 })
}

fn render_text(plan: &RebuildPlan) -> String {
    let mut out = String::new();
    if plan.full_rebuild {
        out.push_str("full rebuild\n");
    }
    for (mark, keys) in [
        ('+', &plan.changes.added),
        ('-', &plan.changes.removed),
        ('~', &plan.changes.changed),
    ] {
        for key in keys {
            out.push_str(&format!("{mark} {key}\n"));
        }
    }
    for file in &plan.files_to_recompile {
        out.push_str(&format!("recompile {file}\n"));
    }
    out
}

fn render_json(plan: &RebuildPlan) -> Result<String, serde_json::Error> {
    let names = |keys: &[quill_depgraph::DependencyKey]| keys.iter().map(ToString::to_string).collect();
    let report = DiffReport {
        full_rebuild: plan.full_rebuild,
        added: names(&plan.changes.added),
        removed: names(&plan.changes.removed),
        changed: names(&plan.changes.changed),
        files_to_recompile: &plan.files_to_recompile,
    };
    serde_json::to_string_pretty(&report)
}
