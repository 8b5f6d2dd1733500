//! Requests the driver issues once per file.

use crate::error::RequestError;
use crate::evaluator::Evaluator;
use crate::request::{ActiveSource, CacheKind, DependencySink, DependencySource, Request};
use crate::requests::ast::StablePathRequest;
use quill_common::Fingerprint;
use quill_source::FileId;
use std::sync::Arc;

/// Records every top-level declaration of a file as a provided name.
///
/// Each name is fingerprinted by its declaration's stable path; overloads
/// sharing a name keep the last one's fingerprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProvidesForFileRequest(pub FileId);

impl Request for ProvidesForFileRequest {
    type Output = Vec<(String, Fingerprint)>;
    const NAME: &'static str = "ProvidesForFileRequest";
    const CACHING: CacheKind = CacheKind::Uncached;

    fn evaluate(&self, ev: &mut Evaluator) -> Result<Self::Output, RequestError> {
        let ast = Arc::clone(ev.ast());
        let mut provides = Vec::new();
        for &decl in ast.top_level_decls(self.0) {
            if !ast[decl].kind.is_value_or_type() {
                continue;
            }
            let path = ev.evaluate(StablePathRequest(decl))?;
            provides.push((ast.name(decl).to_string(), Fingerprint::from_stable_path(path.fingerprint())));
        }
        tracing::debug!(file = %self.0, provides = provides.len(), "collected provides");
        Ok(provides)
    }

    fn as_source(&self) -> Option<&dyn DependencySource> {
        Some(self)
    }

    fn as_sink(&self) -> Option<&dyn DependencySink<Self::Output>> {
        Some(self)
    }
}

impl DependencySource for ProvidesForFileRequest {
    fn read_dependency_source(&self, _ev: &Evaluator) -> Option<ActiveSource> {
        Some(ActiveSource {
            file: self.0,
            cascades: true,
        })
    }
}

impl DependencySink<Vec<(String, Fingerprint)>> for ProvidesForFileRequest {
    fn write_dependency_sink(&self, ev: &mut Evaluator, value: &Vec<(String, Fingerprint)>) {
        if let Some(tracker) = ev.active_tracker() {
            for (name, fingerprint) in value {
                tracker.add_provide(name.as_str(), Some(*fingerprint));
            }
        }
    }
}
