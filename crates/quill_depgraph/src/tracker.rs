//! Per-file records of provided and used names.

use crate::key::NodeKind;
use quill_common::Fingerprint;
use quill_source::FileId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Everything one source file provides to, and uses from, the rest of the
/// compilation unit.
///
/// Each use carries a cascading flag. Recording the same use twice keeps the
/// flag set if either recording cascaded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferencedNameTracker {
    provides: BTreeMap<String, Option<Fingerprint>>,
    top_level: BTreeMap<String, bool>,
    /// Context, then member name. An empty member name is a potential member.
    members: BTreeMap<String, BTreeMap<String, bool>>,
    dynamic_lookup: BTreeMap<String, bool>,
    externals: BTreeSet<String>,
}

fn merge(slot: &mut bool, cascades: bool) {
    *slot |= cascades;
}

impl ReferencedNameTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the file declares `name` at module scope.
    pub fn add_provide(&mut self, name: impl Into<String>, fingerprint: Option<Fingerprint>) {
        let slot = self.provides.entry(name.into()).or_insert(None);
        if fingerprint.is_some() {
            *slot = fingerprint;
        }
    }

    /// Records a use of a module-scope name.
    pub fn add_top_level_name(&mut self, name: impl Into<String>, cascades: bool) {
        merge(self.top_level.entry(name.into()).or_insert(false), cascades);
    }

    /// Records a use of `context.name`; an empty `name` uses any member.
    pub fn add_used_member(&mut self, context: impl Into<String>, name: impl Into<String>, cascades: bool) {
        let names = self.members.entry(context.into()).or_default();
        merge(names.entry(name.into()).or_insert(false), cascades);
    }

    /// Records a dynamic member lookup of `name`.
    pub fn add_dynamic_lookup_name(&mut self, name: impl Into<String>, cascades: bool) {
        merge(self.dynamic_lookup.entry(name.into()).or_insert(false), cascades);
    }

    /// Records a dependency on a file outside the compilation unit.
    pub fn add_external_dependency(&mut self, path: impl Into<String>) {
        self.externals.insert(path.into());
    }

    /// Provided names with their fingerprints, sorted by name.
    pub fn provides(&self) -> impl Iterator<Item = (&str, Option<Fingerprint>)> {
        self.provides.iter().map(|(name, fp)| (name.as_str(), *fp))
    }

    /// External dependency paths, sorted.
    pub fn external_dependencies(&self) -> impl Iterator<Item = &str> {
        self.externals.iter().map(String::as_str)
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.provides.is_empty()
            && self.top_level.is_empty()
            && self.members.is_empty()
            && self.dynamic_lookup.is_empty()
            && self.externals.is_empty()
    }

    /// Calls `f(kind, context, name, cascades)` for every recorded fact.
    ///
    /// Provided names come first as [`NodeKind::SourceFileProvide`], then
    /// top-level uses, then member-like uses grouped by context (a
    /// [`NodeKind::Nominal`] entry precedes each context's members), then
    /// dynamic lookups and external dependencies. Within each group entries
    /// are sorted, so the order is stable across runs.
    pub fn enumerate_all_uses(&self, mut f: impl FnMut(NodeKind, &str, &str, bool)) {
        for name in self.provides.keys() {
            f(NodeKind::SourceFileProvide, "", name, false);
        }
        for (name, &cascades) in &self.top_level {
            f(NodeKind::TopLevel, "", name, cascades);
        }
        for (context, names) in &self.members {
            let nominal_cascades = names.values().any(|&c| c);
            f(NodeKind::Nominal, context, "", nominal_cascades);
            for (name, &cascades) in names {
                let kind = if name.is_empty() {
                    NodeKind::PotentialMember
                } else {
                    NodeKind::Member
                };
                f(kind, context, name, cascades);
            }
        }
        for (name, &cascades) in &self.dynamic_lookup {
            f(NodeKind::DynamicLookup, "", name, cascades);
        }
        for path in &self.externals {
            f(NodeKind::ExternalDepend, "", path, false);
        }
    }
}

/// Owns one [`ReferencedNameTracker`] per source file.
#[derive(Clone, Debug, Default)]
pub struct DependencyCollector {
    trackers: BTreeMap<FileId, ReferencedNameTracker>,
}

impl DependencyCollector {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// The tracker for `file`, created on first access.
    pub fn tracker_mut(&mut self, file: FileId) -> &mut ReferencedNameTracker {
        self.trackers.entry(file).or_default()
    }

    /// The tracker for `file`, if anything was recorded for it.
    pub fn tracker(&self, file: FileId) -> Option<&ReferencedNameTracker> {
        self.trackers.get(&file)
    }

    /// Installs a tracker built elsewhere, replacing any existing one.
    pub fn insert(&mut self, file: FileId, tracker: ReferencedNameTracker) {
        self.trackers.insert(file, tracker);
    }

    /// All trackers in file order.
    pub fn iter(&self) -> impl Iterator<Item = (FileId, &ReferencedNameTracker)> {
        self.trackers.iter().map(|(id, t)| (*id, t))
    }

    /// Number of files with a tracker.
    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    /// Whether no file has a tracker.
    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(tracker: &ReferencedNameTracker) -> Vec<(NodeKind, String, String, bool)> {
        let mut out = Vec::new();
        tracker.enumerate_all_uses(|kind, context, name, cascades| {
            out.push((kind, context.to_string(), name.to_string(), cascades));
        });
        out
    }

    #[test]
    fn cascading_flag_is_sticky() {
        let mut t = ReferencedNameTracker::new();
        t.add_top_level_name("print", true);
        t.add_top_level_name("print", false);
        let uses = collect(&t);
        assert_eq!(uses, vec![(NodeKind::TopLevel, String::new(), "print".into(), true)]);
    }

    #[test]
    fn members_yield_nominal_first() {
        let mut t = ReferencedNameTracker::new();
        t.add_used_member("Foo", "bar", false);
        t.add_used_member("Foo", "", true);
        let uses = collect(&t);
        assert_eq!(uses.len(), 3);
        assert_eq!(uses[0], (NodeKind::Nominal, "Foo".into(), String::new(), true));
        assert_eq!(uses[1], (NodeKind::PotentialMember, "Foo".into(), String::new(), true));
        assert_eq!(uses[2], (NodeKind::Member, "Foo".into(), "bar".into(), false));
    }

    #[test]
    fn enumeration_order_is_grouped() {
        let mut t = ReferencedNameTracker::new();
        t.add_external_dependency("/sdk/Foundation.swiftmodule");
        t.add_dynamic_lookup_name("objcMethod", false);
        t.add_top_level_name("x", false);
        t.add_provide("Widget", None);
        let kinds: Vec<NodeKind> = collect(&t).into_iter().map(|u| u.0).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::SourceFileProvide,
                NodeKind::TopLevel,
                NodeKind::DynamicLookup,
                NodeKind::ExternalDepend,
            ]
        );
    }

    #[test]
    fn provide_keeps_known_fingerprint() {
        let mut t = ReferencedNameTracker::new();
        let fp = Fingerprint::from_u128(9);
        t.add_provide("A", Some(fp));
        t.add_provide("A", None);
        assert_eq!(t.provides().collect::<Vec<_>>(), vec![("A", Some(fp))]);
    }

    #[test]
    fn tracker_json_roundtrip() {
        let mut t = ReferencedNameTracker::new();
        t.add_used_member("Foo", "bar", true);
        t.add_provide("Foo", Some(Fingerprint::from_u128(1)));
        let json = serde_json::to_string(&t).unwrap();
        let back: ReferencedNameTracker = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn missing_fields_default_when_deserializing() {
        let t: ReferencedNameTracker = serde_json::from_str(r#"{"top_level":{"f":true}}"#).unwrap();
        assert!(!t.is_empty());
        assert_eq!(collect(&t).len(), 1);
    }

    #[test]
    fn collector_creates_trackers_on_demand() {
        let mut c = DependencyCollector::new();
        assert!(c.tracker(FileId::from_raw(0)).is_none());
        c.tracker_mut(FileId::from_raw(0)).add_top_level_name("a", false);
        assert_eq!(c.len(), 1);
        assert!(c.tracker(FileId::from_raw(0)).is_some());
    }
}
