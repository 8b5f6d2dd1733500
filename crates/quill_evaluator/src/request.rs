//! The request abstraction and its dependency-tracking capabilities.

use crate::error::RequestError;
use crate::evaluator::Evaluator;
use quill_common::StablePathId;
use quill_source::FileId;
use std::fmt::Debug;
use std::hash::Hash;

/// How a request's results are remembered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheKind {
    /// In the evaluator's cache, keyed by the request value.
    Cached,
    /// In a side table keyed by the [`StablePathId`] from
    /// [`Request::separate_cache_key`].
    SeparatelyCached,
    /// Recomputed on every evaluation.
    Uncached,
}

/// A memoizable unit of compiler work.
///
/// Requests are plain values: equal requests always produce equal outputs
/// within one compilation job.
pub trait Request: Clone + Eq + Hash + Debug + 'static {
    /// The computed value.
    type Output: Clone + 'static;

    /// Name used in logs, statistics, and cycle reports.
    const NAME: &'static str;

    /// Caching policy recorded when the request is registered in a zone.
    const CACHING: CacheKind = CacheKind::Cached;

    /// Computes the output. May evaluate further requests through `ev`.
    fn evaluate(&self, ev: &mut Evaluator) -> Result<Self::Output, RequestError>;

    /// Key into the side table; only consulted for
    /// [`CacheKind::SeparatelyCached`] requests.
    fn separate_cache_key(&self, _ev: &mut Evaluator) -> Option<StablePathId> {
        None
    }

    /// The request as a dependency source, if it is one.
    fn as_source(&self) -> Option<&dyn DependencySource> {
        None
    }

    /// The request as a dependency sink, if it is one.
    fn as_sink(&self) -> Option<&dyn DependencySink<Self::Output>> {
        None
    }

    /// Human-readable description for cycle reports.
    fn describe(&self) -> String {
        format!("{}({:?})", Self::NAME, self)
    }
}

/// The file whose tracker receives the dependencies recorded while a source
/// request, and everything it evaluates, is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveSource {
    /// The attributed file.
    pub file: FileId,
    /// Whether uses recorded under this source cascade.
    pub cascades: bool,
}

/// A request that establishes which file's tracker its work is attributed to.
pub trait DependencySource {
    /// The file and cascading flag, or `None` if the request is not tied to
    /// a file.
    fn read_dependency_source(&self, ev: &Evaluator) -> Option<ActiveSource>;
}

/// A request whose result is a fact the active file depends on.
///
/// The hook runs after every successful evaluation, including cache hits.
pub trait DependencySink<T> {
    /// Records the dependency, typically through
    /// [`Evaluator::active_tracker`].
    fn write_dependency_sink(&self, ev: &mut Evaluator, value: &T);
}
