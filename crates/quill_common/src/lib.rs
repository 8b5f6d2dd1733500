//! Shared foundational types used across the Quill incremental compiler core.
//!
//! This crate provides the process-independent [`StableHasher`], the
//! [`StablePath`] identity scheme for declarations, content [`Fingerprint`]s,
//! interned identifiers, and the internal error type.

#![warn(missing_docs)]

pub mod fingerprint;
pub mod ident;
pub mod result;
pub mod stable_hasher;
pub mod stable_path;

pub use fingerprint::Fingerprint;
pub use ident::{Ident, Interner};
pub use result::{InternalError, QuillResult};
pub use stable_hasher::{stable_hash_of, StableHash, StableHasher};
pub use stable_path::{PathComponent, StablePath, StablePathId};
