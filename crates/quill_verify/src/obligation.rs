//! Dependencies a file actually recorded, as obligations to be matched.

use crate::expectation::{ExpectationKind, ExpectationScope};
use quill_depgraph::{NodeKind, ReferencedNameTracker};
use std::collections::HashMap;

/// Index of an obligation: its rendered key and its kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObligationKey {
    /// `Type` for potential members, `Type.member` for members, the bare
    /// name otherwise.
    pub name: String,
    /// Kind of expectation that can match it.
    pub kind: ExpectationKind,
}

impl ObligationKey {
    /// Creates a key.
    pub fn new(name: impl Into<String>, kind: ExpectationKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Progress of an obligation through verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObligationState {
    /// Not yet matched.
    Owed,
    /// Matched by an expectation.
    Fulfilled,
    /// Matched, but the match was wrong or forbidden.
    Failed,
}

/// One recorded dependency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Obligation {
    /// The recorded name component.
    pub name: String,
    /// Its kind.
    pub kind: ExpectationKind,
    /// Its cascading-ness.
    pub scope: ExpectationScope,
    state: ObligationState,
}

impl Obligation {
    /// Creates an owed obligation.
    pub fn new(name: impl Into<String>, kind: ExpectationKind, scope: ExpectationScope) -> Self {
        Self {
            name: name.into(),
            kind,
            scope,
            state: ObligationState::Owed,
        }
    }

    /// The current state.
    pub fn state(&self) -> ObligationState {
        self.state
    }

    /// Whether it is still waiting for a match.
    pub fn is_owed(&self) -> bool {
        self.state == ObligationState::Owed
    }

    /// Whether the recorded use cascades.
    pub fn cascades(&self) -> bool {
        self.scope == ExpectationScope::Cascading
    }

    /// Marks the obligation as met.
    pub fn fulfill(&mut self) {
        debug_assert!(self.is_owed(), "obligation settled twice");
        self.state = ObligationState::Fulfilled;
    }

    /// Marks the obligation as matched but wrong.
    pub fn fail(&mut self) {
        debug_assert!(self.is_owed(), "obligation settled twice");
        self.state = ObligationState::Failed;
    }
}

/// Obligations in first-recorded order, indexed by key.
#[derive(Debug, Default)]
pub struct ObligationMap {
    entries: Vec<(ObligationKey, Obligation)>,
    index: HashMap<ObligationKey, usize>,
}

impl ObligationMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the obligations of one file from its tracker.
    ///
    /// External dependencies and nominal entries produce nothing; a
    /// nominal's members are checked individually. Top-level uses and
    /// provided names both become provides obligations.
    pub fn from_tracker(tracker: &ReferencedNameTracker) -> Self {
        let mut map = Self::new();
        tracker.enumerate_all_uses(|kind, context, name, cascades| {
            let scope = ExpectationScope::of_use(cascades);
            match kind {
                NodeKind::ExternalDepend | NodeKind::Nominal => {}
                NodeKind::PotentialMember => {
                    map.insert(
                        ObligationKey::new(context, ExpectationKind::PotentialMember),
                        Obligation::new(name, ExpectationKind::PotentialMember, scope),
                    );
                }
                NodeKind::Member => {
                    map.insert(
                        ObligationKey::new(format!("{context}.{name}"), ExpectationKind::Member),
                        Obligation::new(context, ExpectationKind::Member, scope),
                    );
                }
                NodeKind::DynamicLookup => {
                    map.insert(
                        ObligationKey::new(name, ExpectationKind::DynamicMember),
                        Obligation::new(name, ExpectationKind::DynamicMember, scope),
                    );
                }
                NodeKind::TopLevel | NodeKind::SourceFileProvide => {
                    map.insert(
                        ObligationKey::new(name, ExpectationKind::Provides),
                        Obligation::new(name, ExpectationKind::Provides, ExpectationScope::None),
                    );
                }
            }
        });
        map
    }

    /// Adds an obligation unless one with the same key exists. Returns
    /// whether it was added.
    pub fn insert(&mut self, key: ObligationKey, obligation: Obligation) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, obligation));
        true
    }

    /// The obligation for `key`.
    pub fn get(&self, key: &ObligationKey) -> Option<&Obligation> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// The obligation for `key`, mutably.
    pub fn get_mut(&mut self, key: &ObligationKey) -> Option<&mut Obligation> {
        let i = *self.index.get(key)?;
        Some(&mut self.entries[i].1)
    }

    /// All entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&ObligationKey, &Obligation)> {
        self.entries.iter().map(|(k, o)| (k, o))
    }

    /// All entries in insertion order, obligations mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&ObligationKey, &mut Obligation)> {
        self.entries.iter_mut().map(|(k, o)| (&*k, o))
    }

    /// Number of obligations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are none.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_common::Fingerprint;

    fn keys(map: &ObligationMap) -> Vec<(String, ExpectationKind, ExpectationScope)> {
        map.iter().map(|(k, o)| (k.name.clone(), k.kind, o.scope)).collect()
    }

    #[test]
    fn tracker_uses_become_obligations() {
        let mut t = ReferencedNameTracker::new();
        t.add_provide("Foo", Some(Fingerprint::from_u128(1)));
        t.add_top_level_name("helper", true);
        t.add_used_member("Base", "", false);
        t.add_used_member("Foo", "bar", true);
        t.add_dynamic_lookup_name("ping", false);
        t.add_external_dependency("/sdk/Swift.swiftmodule");

        let map = ObligationMap::from_tracker(&t);
        assert_eq!(keys(&map), vec![
            ("Foo".to_string(), ExpectationKind::Provides, ExpectationScope::None),
            ("helper".to_string(), ExpectationKind::Provides, ExpectationScope::None),
            ("Base".to_string(), ExpectationKind::PotentialMember, ExpectationScope::Private),
            ("Foo.bar".to_string(), ExpectationKind::Member, ExpectationScope::Cascading),
            ("ping".to_string(), ExpectationKind::DynamicMember, ExpectationScope::Private),
        ]);
        assert!(map.iter().all(|(_, o)| o.is_owed()));
    }

    #[test]
    fn first_insertion_wins() {
        let mut t = ReferencedNameTracker::new();
        t.add_provide("Foo", None);
        t.add_top_level_name("Foo", true);
        let map = ObligationMap::from_tracker(&t);
        assert_eq!(map.len(), 1);

        let mut map = ObligationMap::new();
        let key = ObligationKey::new("A", ExpectationKind::Member);
        assert!(map.insert(key.clone(), Obligation::new("A", ExpectationKind::Member, ExpectationScope::Private)));
        assert!(!map.insert(key.clone(), Obligation::new("A", ExpectationKind::Member, ExpectationScope::Cascading)));
        assert_eq!(map.get(&key).unwrap().scope, ExpectationScope::Private);
    }

    #[test]
    fn same_name_different_kind_are_distinct() {
        let mut t = ReferencedNameTracker::new();
        t.add_top_level_name("Foo", false);
        t.add_used_member("Foo", "", false);
        let map = ObligationMap::from_tracker(&t);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn settling_changes_state() {
        let mut map = ObligationMap::new();
        let key = ObligationKey::new("x", ExpectationKind::Provides);
        map.insert(key.clone(), Obligation::new("x", ExpectationKind::Provides, ExpectationScope::None));
        map.get_mut(&key).unwrap().fulfill();
        assert_eq!(map.get(&key).unwrap().state(), ObligationState::Fulfilled);
        assert!(map.get_mut(&ObligationKey::new("x", ExpectationKind::Member)).is_none());
    }
}
