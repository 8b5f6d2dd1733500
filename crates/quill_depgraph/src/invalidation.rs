//! Which files must be recompiled after a set of provided facts changed.

use crate::diff::GraphChangeSet;
use crate::graph::ModuleDepGraph;
use crate::key::{DeclAspect, DependencyKey, NodeKind};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Provided keys a use can be satisfied by.
///
/// Member-like uses also depend on the top-level declaration of their
/// context type.
fn providers_of(key: &DependencyKey) -> Vec<DependencyKey> {
    let mut keys = vec![key.clone()];
    match key.kind {
        NodeKind::Nominal | NodeKind::PotentialMember | NodeKind::Member if !key.context.is_empty() => {
            keys.push(DependencyKey::top_level(key.aspect, key.context.clone()));
        }
        _ => {}
    }
    keys
}

/// File-level dependency edges derived from a [`ModuleDepGraph`].
///
/// An edge runs from the file providing a fact to each file using it,
/// weighted by the aspect of the use. A file reached through an interface
/// edge passes invalidation on to its own users.
#[derive(Debug, Default)]
pub struct InvalidationGraph {
    graph: DiGraph<String, DeclAspect>,
    files: BTreeMap<String, NodeIndex>,
    /// Depends keys, mapped to the files using them.
    users: BTreeMap<DependencyKey, BTreeSet<String>>,
}

impl InvalidationGraph {
    fn file_index(&mut self, file: &str) -> NodeIndex {
        if let Some(&index) = self.files.get(file) {
            return index;
        }
        let index = self.graph.add_node(file.to_string());
        self.files.insert(file.to_string(), index);
        index
    }

    /// Builds the file graph from every owned node in `graph`.
    pub fn build(graph: &ModuleDepGraph) -> Self {
        let mut this = Self::default();
        let mut providers: BTreeMap<&DependencyKey, Vec<&str>> = BTreeMap::new();

        for node in graph.nodes() {
            let Some(owner) = node.swift_deps.as_deref() else {
                continue;
            };
            this.file_index(owner);
            if node.is_provides {
                providers.entry(&node.key).or_default().push(owner);
            } else {
                this.users
                    .entry(node.key.clone())
                    .or_default()
                    .insert(owner.to_string());
            }
        }

        let mut edges = BTreeSet::new();
        for (key, users) in &this.users {
            for candidate in providers_of(key) {
                for provider in providers.get(&candidate).into_iter().flatten() {
                    for user in users {
                        if provider != user {
                            edges.insert((provider.to_string(), user.clone(), key.aspect));
                        }
                    }
                }
            }
        }
        for (provider, user, aspect) in edges {
            let from = this.file_index(&provider);
            let to = this.file_index(&user);
            this.graph.add_edge(from, to, aspect);
        }
        this
    }

    /// Number of files in the graph.
    pub fn file_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Files directly using `provider`'s facts, sorted.
    pub fn direct_users(&self, provider: &str) -> Vec<&str> {
        let Some(&index) = self.files.get(provider) else {
            return Vec::new();
        };
        let users: BTreeSet<&str> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .map(|edge| self.graph[edge.target()].as_str())
            .collect();
        users.into_iter().collect()
    }

    /// Files that must be recompiled because of `changes`, sorted.
    ///
    /// Every user of a dirty key is included. A file dirtied through an
    /// interface use also dirties every file using it, and the walk continues
    /// from those that use it through their interface.
    pub fn files_to_recompile(&self, changes: &GraphChangeSet) -> Vec<String> {
        // file -> whether its recompilation cascades to its users
        let mut dirty: BTreeMap<&str, bool> = BTreeMap::new();
        for changed in changes.dirty_keys() {
            for (used, users) in &self.users {
                if providers_of(used).contains(changed) {
                    for user in users {
                        *dirty.entry(user.as_str()).or_insert(false) |= used.aspect == DeclAspect::Interface;
                    }
                }
            }
        }

        let mut queue: VecDeque<NodeIndex> = dirty
            .iter()
            .filter(|(_, cascades)| **cascades)
            .filter_map(|(file, _)| self.files.get(*file).copied())
            .collect();
        while let Some(index) = queue.pop_front() {
            for edge in self.graph.edges_directed(index, Direction::Outgoing) {
                let user = self.graph[edge.target()].as_str();
                let cascades = *edge.weight() == DeclAspect::Interface;
                let slot = dirty.entry(user).or_insert(false);
                let newly_cascading = cascades && !*slot;
                *slot |= cascades;
                if newly_cascading {
                    queue.push_back(edge.target());
                }
            }
        }

        tracing::debug!(dirty_keys = changes.dirty_count(), files = dirty.len(), "computed invalidation");
        dirty.into_keys().map(str::to_string).collect()
    }
}
