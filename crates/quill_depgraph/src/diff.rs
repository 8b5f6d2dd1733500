//! Change detection between two dependency graphs.
//!
//! Compares the provides nodes of a previous build's graph with the current
//! one and sorts every provided key into added, removed, changed, or
//! unchanged.

use crate::graph::ModuleDepGraph;
use crate::key::DependencyKey;
use quill_common::Fingerprint;
use serde::Serialize;
use std::collections::BTreeMap;

/// Result of comparing the facts two graphs provide.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphChangeSet {
    /// Keys provided now but not before.
    pub added: Vec<DependencyKey>,
    /// Keys provided before but not now.
    pub removed: Vec<DependencyKey>,
    /// Keys provided in both whose owners or fingerprints differ.
    pub changed: Vec<DependencyKey>,
    /// Keys provided identically in both.
    pub unchanged: Vec<DependencyKey>,
}

/// Each provided key with its sorted `(owner, fingerprint)` providers.
fn provided(graph: &ModuleDepGraph) -> BTreeMap<&DependencyKey, Vec<(Option<&str>, Option<Fingerprint>)>> {
    let mut out: BTreeMap<&DependencyKey, Vec<_>> = BTreeMap::new();
    for node in graph.nodes().filter(|n| n.is_provides) {
        out.entry(&node.key)
            .or_default()
            .push((node.swift_deps.as_deref(), node.fingerprint));
    }
    for providers in out.values_mut() {
        providers.sort();
    }
    out
}

impl GraphChangeSet {
    /// Classifies every key provided by `old` or `new`.
    ///
    /// Each list is sorted. A provides node without a fingerprint compares
    /// equal only to another without one.
    pub fn between(old: &ModuleDepGraph, new: &ModuleDepGraph) -> Self {
        let before = provided(old);
        let after = provided(new);
        let mut changes = GraphChangeSet::default();

        for (key, providers) in &after {
            match before.get(key) {
                Some(previous) if previous == providers => changes.unchanged.push((*key).clone()),
                Some(_) => changes.changed.push((*key).clone()),
                None => changes.added.push((*key).clone()),
            }
        }
        changes.removed = before
            .keys()
            .filter(|key| !after.contains_key(*key))
            .map(|key| (*key).clone())
            .collect();
        changes
    }

    /// Returns `true` if nothing was added, removed, or changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// Keys whose users may need recompiling, sorted.
    pub fn dirty_keys(&self) -> Vec<&DependencyKey> {
        let mut keys: Vec<&DependencyKey> = self
            .added
            .iter()
            .chain(&self.removed)
            .chain(&self.changed)
            .collect();
        keys.sort();
        keys
    }

    /// Number of added, removed, and changed keys.
    pub fn dirty_count(&self) -> usize {
        self.added.len() + self.removed.len() + self.changed.len()
    }
}
