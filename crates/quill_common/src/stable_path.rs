//! Structural, cross-invocation identities for declarations.
//!
//! A [`StablePath`] chains a parent's identity with a component kind and a
//! hash of caller-supplied discriminating data. Two declarations reached
//! through the same chain of `(kind, extras)` pairs share an identity; callers
//! feed in names, signatures, and the like to keep siblings apart.

use crate::stable_hasher::{StableHash, StableHasher};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The opaque 64-bit fingerprint of a [`StablePath`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StablePathId(u64);

impl StablePathId {
    /// The parent identity used by root paths.
    pub const ROOT: Self = Self(0);

    /// Creates an id from a raw digest, for deserialization and tests.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw digest.
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StablePathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl fmt::Debug for StablePathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StablePathId({:016x})", self.0)
    }
}

impl StableHash for StablePathId {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        self.0.stable_hash(hasher);
    }
}

/// The role a path component plays in the lexical chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PathComponent {
    /// A module, always at the root.
    Module = 0,
    /// A type or extension that can hold members.
    Container = 1,
    /// Any other named declaration.
    Name = 2,
}

crate::impl_stable_hash_as!(PathComponent => u8);

/// One link in a declaration's Merkle chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StablePath {
    parent: StablePathId,
    kind: PathComponent,
    extra: u64,
}

impl StablePath {
    /// Starts a chain at a module.
    pub fn root<T: StableHash + ?Sized>(extras: &T) -> Self {
        Self::build(StablePathId::ROOT, PathComponent::Module, extras)
    }

    /// Extends `parent` with a container component.
    pub fn container<T: StableHash + ?Sized>(parent: StablePath, extras: &T) -> Self {
        Self::build(parent.fingerprint(), PathComponent::Container, extras)
    }

    /// Extends `parent` with a leaf name component.
    pub fn name<T: StableHash + ?Sized>(parent: StablePath, extras: &T) -> Self {
        Self::build(parent.fingerprint(), PathComponent::Name, extras)
    }

    fn build<T: StableHash + ?Sized>(parent: StablePathId, kind: PathComponent, extras: &T) -> Self {
        let mut hasher = StableHasher::new();
        hasher.combine(extras);
        Self {
            parent,
            kind,
            extra: hasher.finalize(),
        }
    }

    /// The identity of this path, a pure function of its three fields.
    pub fn fingerprint(&self) -> StablePathId {
        let mut hasher = StableHasher::new();
        hasher.combine(&(self.parent, self.kind, self.extra));
        StablePathId(hasher.finalize())
    }

    /// The parent's identity, or [`StablePathId::ROOT`] for modules.
    pub fn parent(&self) -> StablePathId {
        self.parent
    }

    /// The component kind of this link.
    pub fn kind(&self) -> PathComponent {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module() -> StablePath {
        StablePath::root("Main")
    }

    #[test]
    fn same_chain_same_identity() {
        let a = StablePath::container(module(), "Foo");
        let b = StablePath::container(module(), "Foo");
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn different_extras_differ() {
        let foo = StablePath::container(module(), "Foo");
        let bar = StablePath::container(module(), "Bar");
        assert_ne!(foo.fingerprint(), bar.fingerprint());
    }

    #[test]
    fn parent_is_folded_in() {
        let in_main = StablePath::name(StablePath::root("Main"), "x");
        let in_lib = StablePath::name(StablePath::root("Lib"), "x");
        assert_ne!(in_main.fingerprint(), in_lib.fingerprint());
        assert_eq!(in_main.parent(), StablePath::root("Main").fingerprint());
    }

    #[test]
    fn names_and_containers_are_distinct() {
        let container = StablePath::container(module(), "Foo");
        let name = StablePath::name(module(), "Foo");
        assert_eq!(container.kind(), PathComponent::Container);
        assert_eq!(name.kind(), PathComponent::Name);
        assert_ne!(container.fingerprint(), name.fingerprint());
    }

    #[test]
    fn root_has_root_parent() {
        assert_eq!(module().parent(), StablePathId::ROOT);
        assert_eq!(module().kind(), PathComponent::Module);
    }

    #[test]
    fn tuple_extras() {
        let a = StablePath::name(module(), &(3u8, "f", 0u32));
        let b = StablePath::name(module(), &(3u8, "f", 1u32));
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn display_is_hex() {
        assert_eq!(StablePathId::from_raw(255).to_string(), "00000000000000ff");
    }
}
