//! Declaration names, interned once per compilation.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// A name as the declaration arena and lookups see it.
///
/// Only meaningful next to the [`Interner`] that issued it. Dependency
/// trackers and persisted graphs store the text, never the index.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct Ident(u32);

impl Ident {
    /// An identifier with a made-up index, for building declarations in
    /// tests without an interner.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }
}

// SAFETY: `into_usize` and `try_from_usize` are inverses on every index
// lasso hands out, and indices past `u32::MAX` are refused.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Self)
    }
}

/// Name table shared by the declaration arena and the requests that read
/// it, possibly from several threads.
pub struct Interner(ThreadedRodeo<Ident>);

impl Default for Interner {
    fn default() -> Self {
        Self(ThreadedRodeo::new())
    }
}

impl Interner {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The identifier for `name`, issuing a new one the first time.
    pub fn intern(&self, name: &str) -> Ident {
        self.0.get_or_intern(name)
    }

    /// The identifier for `name` if it was ever interned.
    pub fn find(&self, name: &str) -> Option<Ident> {
        self.0.get(name)
    }

    /// The text behind `ident`. Panics on an identifier from another table.
    pub fn text(&self, ident: Ident) -> &str {
        self.0.resolve(&ident)
    }
}
