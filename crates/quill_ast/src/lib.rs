//! The declaration model consumed by requests.
//!
//! Parsing and type checking live outside the incremental core; this crate
//! holds only what requests need to inspect: an arena of [`Decl`]s with their
//! kind, name, lexical parent, access level, and inheritance clause, plus the
//! file-to-module mapping in [`AstContext`].

#![warn(missing_docs)]

pub mod arena;
pub mod context;
pub mod decl;
pub mod ids;

pub use arena::{Arena, ArenaId};
pub use context::AstContext;
pub use decl::{AccessLevel, AccessorKind, Decl, DeclAttr, DeclKind};
pub use ids::DeclId;
