//! `quill dump`: print a persisted dependency graph.

use quill_depgraph::{try_read_graph_from_path, ModuleDepGraph, ModuleDepGraphNode};
use serde::Serialize;

use crate::{DumpArgs, ReportFormat};

#[derive(Serialize)]
struct GraphReport<'a> {
    nodes: Vec<&'a ModuleDepGraphNode>,
    external_dependencies: &'a [String],
}

/// Runs the `quill dump` command. A graph that cannot be read is an error.
pub fn run(args: &DumpArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let graph = try_read_graph_from_path(&args.graph)?;
    match args.format {
        ReportFormat::Text => print!("{}", render_text(&graph)),
        ReportFormat::Json => println!("{}", render_json(&graph)?),
    }
    Ok(0)
}

fn render_text(graph: &ModuleDepGraph) -> String {
    let mut out = String::new();
    for node in graph.nodes() {
        let role = if node.is_provides { "provides" } else { "depends" };
        let owner = node.swift_deps.as_deref().unwrap_or("<module>");
        out.push_str(&format!("{owner}: {role} {}", node.key));
        if let Some(fingerprint) = node.fingerprint {
            out.push_str(&format!(" [{fingerprint}]"));
        }
        out.push('\n');
    }
    for external in graph.external_dependencies() {
        out.push_str(&format!("external: {external}\n"));
    }
    out
}

fn render_json(graph: &ModuleDepGraph) -> Result<String, serde_json::Error> {
    let report = GraphReport {
        nodes: graph.nodes().collect(),
        external_dependencies: graph.external_dependencies(),
    };
    serde_json::to_string_pretty(&report)
}
