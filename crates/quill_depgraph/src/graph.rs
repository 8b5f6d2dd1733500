//! The in-memory module dependency graph.

use crate::key::{DeclAspect, DependencyKey, NodeKind};
use crate::tracker::ReferencedNameTracker;
use quill_common::Fingerprint;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// One fact in the graph, either provided by or depended on by a file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDepGraphNode {
    /// The fact.
    pub key: DependencyKey,
    /// Content digest of the fact, when known.
    pub fingerprint: Option<Fingerprint>,
    /// The dependency file of the source file that owns this node.
    pub swift_deps: Option<String>,
    /// Whether the owner provides the fact (as opposed to depending on it).
    pub is_provides: bool,
}

impl ModuleDepGraphNode {
    /// A node owned by `swift_deps`.
    pub fn new(
        key: DependencyKey,
        fingerprint: Option<Fingerprint>,
        swift_deps: Option<String>,
        is_provides: bool,
    ) -> Self {
        Self {
            key,
            fingerprint,
            swift_deps,
            is_provides,
        }
    }
}

/// Identity of a node: its owner plus its key.
type NodeSlot = (Option<String>, DependencyKey);

/// A module's dependency graph: nodes keyed by owner and [`DependencyKey`],
/// plus the external files the module depends on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModuleDepGraph {
    nodes: BTreeMap<NodeSlot, ModuleDepGraphNode>,
    external_dependencies: Vec<String>,
}

impl ModuleDepGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `node`, returning the node it replaced if its owner already
    /// had one with the same key.
    pub fn add_node(&mut self, node: ModuleDepGraphNode) -> Option<ModuleDepGraphNode> {
        let slot = (node.swift_deps.clone(), node.key.clone());
        self.nodes.insert(slot, node)
    }

    /// Calls `f` for every node, ordered by owner and then key.
    pub fn for_each_node(&self, mut f: impl FnMut(&ModuleDepGraphNode)) {
        for node in self.nodes.values() {
            f(node);
        }
    }

    /// Iterates over every node, ordered by owner and then key.
    pub fn nodes(&self) -> impl Iterator<Item = &ModuleDepGraphNode> {
        self.nodes.values()
    }

    /// Finds the node owned by `swift_deps` with `key`.
    pub fn find_node(&self, swift_deps: Option<&str>, key: &DependencyKey) -> Option<&ModuleDepGraphNode> {
        self.nodes
            .get(&(swift_deps.map(str::to_string), key.clone()))
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has neither nodes nor external dependencies.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.external_dependencies.is_empty()
    }

    /// Records an external dependency; duplicates are ignored.
    pub fn insert_external_dependency(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        if self.external_dependencies.contains(&path) {
            return false;
        }
        self.external_dependencies.push(path);
        true
    }

    /// External dependencies in insertion order.
    pub fn external_dependencies(&self) -> &[String] {
        &self.external_dependencies
    }

    /// Owners of at least one node, sorted.
    pub fn source_files(&self) -> Vec<&str> {
        let mut files: Vec<&str> = self
            .nodes
            .keys()
            .filter_map(|(owner, _)| owner.as_deref())
            .collect();
        files.dedup();
        files
    }

    /// Drops every node owned by `swift_deps`. Returns how many were removed.
    pub fn remove_source_file(&mut self, swift_deps: &str) -> usize {
        let before = self.nodes.len();
        self.nodes
            .retain(|(owner, _), _| owner.as_deref() != Some(swift_deps));
        before - self.nodes.len()
    }

    /// Replaces the nodes owned by `swift_deps` with those derived from
    /// `tracker`.
    ///
    /// The file itself and every provided name become provides nodes in both
    /// aspects. Every use becomes a depends node whose aspect follows its
    /// cascading flag. External uses are also added to the module's external
    /// dependency list.
    pub fn add_source_file(&mut self, swift_deps: &str, tracker: &ReferencedNameTracker) {
        self.remove_source_file(swift_deps);
        let owner = Some(swift_deps.to_string());

        for aspect in [DeclAspect::Interface, DeclAspect::Implementation] {
            self.add_node(ModuleDepGraphNode::new(
                DependencyKey::source_file(aspect, swift_deps),
                None,
                owner.clone(),
                true,
            ));
            for (name, fingerprint) in tracker.provides() {
                self.add_node(ModuleDepGraphNode::new(
                    DependencyKey::top_level(aspect, name),
                    fingerprint,
                    owner.clone(),
                    true,
                ));
            }
        }

        let mut depends = Vec::new();
        tracker.enumerate_all_uses(|kind, context, name, cascades| {
            if kind == NodeKind::SourceFileProvide {
                return;
            }
            let aspect = if kind == NodeKind::ExternalDepend {
                DeclAspect::Interface
            } else {
                DeclAspect::for_use(cascades)
            };
            depends.push(DependencyKey::new(kind, aspect, context, name));
        });

        for key in depends {
            if key.kind == NodeKind::ExternalDepend {
                self.insert_external_dependency(key.name.clone());
            }
            let slot = (owner.clone(), key);
            if let Entry::Vacant(vacant) = self.nodes.entry(slot) {
                let key = vacant.key().1.clone();
                vacant.insert(ModuleDepGraphNode::new(key, None, owner.clone(), false));
            }
        }
    }
}
