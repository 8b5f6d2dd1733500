//! Shared helpers for CLI commands.
//!
//! Configuration discovery, loading recorded dependencies from JSON, and
//! rendering diagnostics.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use quill_config::{load_config, load_config_from_str, QuillConfig, CONFIG_FILE_NAME};
use quill_depgraph::ReferencedNameTracker;
use quill_diagnostics::{DiagnosticRenderer, DiagnosticSink, TerminalRenderer};
use quill_source::SourceDb;

use crate::GlobalArgs;

/// Walks up from `start` looking for the nearest directory containing
/// `quill.toml`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_FILE_NAME).is_file())
        .map(Path::to_path_buf)
}

/// Loads the configuration for this invocation.
///
/// `--config` names a file or a directory containing `quill.toml` and must
/// exist. Otherwise the nearest `quill.toml` above the current directory is
/// used, and without one the defaults apply.
pub fn resolve_config(global: &GlobalArgs) -> Result<QuillConfig, Box<dyn std::error::Error>> {
    if let Some(ref path) = global.config {
        let config = if path.is_dir() {
            load_config(path)?
        } else {
            load_config_from_str(&std::fs::read_to_string(path)?)?
        };
        return Ok(config);
    }
    match find_project_root(&std::env::current_dir()?) {
        Some(root) => {
            tracing::debug!(root = %root.display(), "using project configuration");
            Ok(load_config(&root)?)
        }
        None => Ok(QuillConfig::default()),
    }
}

/// Reads a JSON object mapping source paths to their recorded dependencies.
pub fn load_uses(path: &Path) -> Result<BTreeMap<PathBuf, ReferencedNameTracker>, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let uses = serde_json::from_str(&text)
        .map_err(|e| format!("cannot parse {}: {e}", path.display()))?;
    Ok(uses)
}

/// The tracker recorded for `file`, matching the path as written or, failing
/// that, by file name.
pub fn tracker_for<'a>(
    uses: &'a BTreeMap<PathBuf, ReferencedNameTracker>,
    file: &Path,
) -> Option<&'a ReferencedNameTracker> {
    uses.get(file).or_else(|| {
        let name = file.file_name()?;
        let mut by_name = uses.iter().filter(|(path, _)| path.file_name() == Some(name));
        match (by_name.next(), by_name.next()) {
            (Some((_, tracker)), None) => Some(tracker),
            _ => None,
        }
    })
}

/// Renders every diagnostic in `sink`, in location order, to stderr.
///
/// Returns the number of diagnostics rendered.
pub fn render_diagnostics(sink: &DiagnosticSink, source_db: &SourceDb, color: bool) -> usize {
    let diagnostics = sink.take_sorted();
    let renderer = TerminalRenderer::new(color, 80);
    for diag in &diagnostics {
        eprintln!("{}", renderer.render(diag, source_db));
    }
    diagnostics.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn global_with(config: Option<PathBuf>) -> GlobalArgs {
        GlobalArgs {
            quiet: false,
            verbose: false,
            color: false,
            config,
        }
    }

    #[test]
    fn find_project_root_in_current_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("quill.toml"), "").unwrap();
        assert_eq!(find_project_root(tmp.path()), Some(tmp.path().to_path_buf()));
    }

    #[test]
    fn find_project_root_in_parent() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("quill.toml"), "").unwrap();
        let nested = tmp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_project_root(&nested), Some(tmp.path().to_path_buf()));
    }

    #[test]
    fn config_from_explicit_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        fs::write(&path, "[verify]\nauto_fix = true\n").unwrap();
        let config = resolve_config(&global_with(Some(path))).unwrap();
        assert!(config.verify.auto_fix);
    }

    #[test]
    fn config_from_explicit_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("quill.toml"), "[log]\nfilter = \"quill=trace\"\n").unwrap();
        let config = resolve_config(&global_with(Some(tmp.path().to_path_buf()))).unwrap();
        assert_eq!(config.log.filter.as_deref(), Some("quill=trace"));
    }

    #[test]
    fn explicit_config_must_exist() {
        let tmp = TempDir::new().unwrap();
        assert!(resolve_config(&global_with(Some(tmp.path().join("none.toml")))).is_err());
    }

    #[test]
    fn uses_round_trip_through_json() {
        let tmp = TempDir::new().unwrap();
        let mut tracker = ReferencedNameTracker::new();
        tracker.add_provide("Foo", None);
        tracker.add_used_member("Bar", "baz", true);
        let mut uses = BTreeMap::new();
        uses.insert(PathBuf::from("src/main.swift"), tracker.clone());
        let path = tmp.path().join("uses.json");
        fs::write(&path, serde_json::to_string(&uses).unwrap()).unwrap();

        let loaded = load_uses(&path).unwrap();
        assert_eq!(loaded.get(Path::new("src/main.swift")), Some(&tracker));
    }

    #[test]
    fn malformed_uses_name_the_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("uses.json");
        fs::write(&path, "[1, 2").unwrap();
        let err = load_uses(&path).unwrap_err();
        assert!(err.to_string().contains("uses.json"));
    }

    #[test]
    fn tracker_lookup_falls_back_to_unique_file_name() {
        let mut uses = BTreeMap::new();
        uses.insert(PathBuf::from("src/a.swift"), ReferencedNameTracker::new());
        uses.insert(PathBuf::from("src/b.swift"), ReferencedNameTracker::new());
        uses.insert(PathBuf::from("other/b.swift"), ReferencedNameTracker::new());
        assert!(tracker_for(&uses, Path::new("src/a.swift")).is_some());
        assert!(tracker_for(&uses, Path::new("/abs/src/a.swift")).is_some());
        assert!(tracker_for(&uses, Path::new("/abs/b.swift")).is_none());
        assert!(tracker_for(&uses, Path::new("c.swift")).is_none());
    }
}
