//! The memoizing request evaluator.

use crate::error::RequestError;
use crate::registry::{RegisteredRequest, RequestRegistry};
use crate::request::{ActiveSource, CacheKind, Request};
use quill_ast::AstContext;
use quill_common::{InternalError, StablePathId};
use quill_depgraph::{DependencyCollector, ReferencedNameTracker};
use serde::Serialize;
use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Per-request counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RequestStatistics {
    /// Times the request body ran.
    pub evaluated: u64,
    /// Times a cached value was returned.
    pub cache_hits: u64,
    /// Times evaluation returned an error, cycles included.
    pub failures: u64,
    /// Times the request was re-entered while in progress.
    pub cycles: u64,
}

/// Cache tables of one request type.
struct RequestTables<R: Request> {
    cache: HashMap<R, R::Output>,
    separate: HashMap<StablePathId, R::Output>,
}

impl<R: Request> Default for RequestTables<R> {
    fn default() -> Self {
        Self {
            cache: HashMap::new(),
            separate: HashMap::new(),
        }
    }
}

struct ActiveRequest {
    request: Box<dyn Any>,
    description: String,
}

/// Evaluates requests, memoizing results and attributing recorded
/// dependencies to the active source file.
///
/// One evaluator serves one compilation job on one thread.
pub struct Evaluator {
    registry: RequestRegistry,
    ast: Arc<AstContext>,
    tables: HashMap<TypeId, Box<dyn Any>>,
    active: Vec<ActiveRequest>,
    sources: Vec<ActiveSource>,
    collector: DependencyCollector,
    stats: BTreeMap<&'static str, RequestStatistics>,
}

impl Evaluator {
    /// Creates an evaluator dispatching through `registry`.
    pub fn new(registry: RequestRegistry, ast: Arc<AstContext>) -> Self {
        Self {
            registry,
            ast,
            tables: HashMap::new(),
            active: Vec::new(),
            sources: Vec::new(),
            collector: DependencyCollector::new(),
            stats: BTreeMap::new(),
        }
    }

    /// The declarations requests read from.
    pub fn ast(&self) -> &Arc<AstContext> {
        &self.ast
    }

    /// The dispatch table.
    pub fn registry(&self) -> &RequestRegistry {
        &self.registry
    }

    /// Evaluates `request`, returning a cached value when one exists.
    pub fn evaluate<R: Request>(&mut self, request: R) -> Result<R::Output, RequestError> {
        let Some(entry) = self.registry.lookup::<R>().copied() else {
            return Err(InternalError::new(format!("request {} is not registered in any zone", R::NAME)).into());
        };

        if let Some(first) = self
            .active
            .iter()
            .position(|active| active.request.downcast_ref::<R>() == Some(&request))
        {
            let stack: Vec<String> = self.active[first..]
                .iter()
                .map(|active| active.description.clone())
                .collect();
            let stats = self.stats_mut(R::NAME);
            stats.cycles += 1;
            stats.failures += 1;
            tracing::debug!(request = R::NAME, depth = stack.len(), "request cycle");
            return Err(RequestError::Cycle {
                request: request.describe(),
                stack,
            });
        }

        let separate_key = match entry.caching {
            CacheKind::SeparatelyCached => request.separate_cache_key(self),
            CacheKind::Cached | CacheKind::Uncached => None,
        };

        // The source stays active until the sink has run, so a request that
        // is both records into its own file.
        let source = request
            .as_source()
            .and_then(|source| source.read_dependency_source(self));
        if let Some(source) = source {
            self.sources.push(source);
        }
        let result = self.evaluate_in_source(entry, &request, separate_key);
        if source.is_some() {
            self.sources.pop();
        }
        result
    }

    fn evaluate_in_source<R: Request>(
        &mut self,
        entry: RegisteredRequest,
        request: &R,
        separate_key: Option<StablePathId>,
    ) -> Result<R::Output, RequestError> {
        let cached = match (entry.caching, separate_key) {
            (CacheKind::Uncached, _) => None,
            (_, Some(key)) => self.tables::<R>()?.separate.get(&key).cloned(),
            (_, None) => self.tables::<R>()?.cache.get(request).cloned(),
        };
        if let Some(value) = cached {
            self.stats_mut(R::NAME).cache_hits += 1;
            if let Some(sink) = request.as_sink() {
                sink.write_dependency_sink(self, &value);
            }
            return Ok(value);
        }

        self.active.push(ActiveRequest {
            request: Box::new(request.clone()),
            description: request.describe(),
        });
        let result = {
            let _span = tracing::trace_span!("request", name = R::NAME, zone = %entry.zone).entered();
            (entry.evaluate_fn)(request, self)
        };
        self.active.pop();

        let stats = self.stats_mut(R::NAME);
        stats.evaluated += 1;
        let value = match result {
            Ok(boxed) => match boxed.downcast::<R::Output>() {
                Ok(value) => *value,
                Err(_) => {
                    stats.failures += 1;
                    return Err(InternalError::new(format!("{} produced a foreign output type", R::NAME)).into());
                }
            },
            Err(err) => {
                stats.failures += 1;
                return Err(err);
            }
        };

        match (entry.caching, separate_key) {
            (CacheKind::Uncached, _) => {}
            (_, Some(key)) => {
                self.tables::<R>()?.separate.insert(key, value.clone());
            }
            (_, None) => {
                self.tables::<R>()?.cache.insert(request.clone(), value.clone());
            }
        }

        if let Some(sink) = request.as_sink() {
            sink.write_dependency_sink(self, &value);
        }
        Ok(value)
    }

    /// Evaluates `request`, substituting `default` on any error.
    pub fn evaluate_or_default<R: Request>(&mut self, request: R, default: R::Output) -> R::Output {
        match self.evaluate(request) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(request = R::NAME, error = %err, "using default");
                default
            }
        }
    }

    /// Whether a value for `request` is in the primary cache.
    pub fn is_cached<R: Request>(&self, request: &R) -> bool {
        self.tables
            .get(&TypeId::of::<R>())
            .and_then(|tables| tables.downcast_ref::<RequestTables<R>>())
            .is_some_and(|tables| tables.cache.contains_key(request))
    }

    /// Drops every cached value.
    pub fn clear_cache(&mut self) {
        self.tables.clear();
    }

    /// The innermost active source, if any.
    pub fn active_source(&self) -> Option<ActiveSource> {
        self.sources.last().copied()
    }

    /// Whether uses recorded now cascade. False when no source is active.
    pub fn is_active_source_cascading(&self) -> bool {
        self.sources.last().is_some_and(|source| source.cascades)
    }

    /// The tracker of the active source file, created on first use.
    pub fn active_tracker(&mut self) -> Option<&mut ReferencedNameTracker> {
        let file = self.sources.last()?.file;
        Some(self.collector.tracker_mut(file))
    }

    /// Trackers recorded so far.
    pub fn collector(&self) -> &DependencyCollector {
        &self.collector
    }

    /// Hands off the recorded trackers, leaving none behind.
    pub fn take_trackers(&mut self) -> DependencyCollector {
        std::mem::take(&mut self.collector)
    }

    /// Counters for every request evaluated so far, by name.
    pub fn statistics(&self) -> &BTreeMap<&'static str, RequestStatistics> {
        &self.stats
    }

    fn stats_mut(&mut self, name: &'static str) -> &mut RequestStatistics {
        self.stats.entry(name).or_default()
    }

    fn tables<R: Request>(&mut self) -> Result<&mut RequestTables<R>, RequestError> {
        self.tables
            .entry(TypeId::of::<R>())
            .or_insert_with(|| Box::new(RequestTables::<R>::default()))
            .downcast_mut::<RequestTables<R>>()
            .ok_or_else(|| InternalError::new(format!("cache table of {} has the wrong type", R::NAME)).into())
    }
}
