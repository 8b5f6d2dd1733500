//! 128-bit content fingerprints attached to dependency-graph nodes.

use crate::stable_path::StablePathId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 128-bit digest naming the content of a provided declaration.
///
/// Fingerprints are compared for equality only. The graph file stores them as
/// their 32-digit lowercase hex text, which is also the [`Display`](fmt::Display)
/// form and what [`Fingerprint::from_hex`] accepts.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(u128);

impl Fingerprint {
    /// Number of hex digits in the text form.
    pub const HEX_LEN: usize = 32;

    /// Fingerprints arbitrary bytes with XXH3-128.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(xxhash_rust::xxh3::xxh3_128(data))
    }

    /// Wraps a raw 128-bit value.
    pub const fn from_u128(value: u128) -> Self {
        Self(value)
    }

    /// Widens a declaration's stable path identity into a fingerprint.
    pub fn from_stable_path(id: StablePathId) -> Self {
        Self(u128::from(id.as_raw()))
    }

    /// Returns the raw 128-bit value.
    pub const fn as_u128(self) -> u128 {
        self.0
    }

    /// Parses the text form written by [`Display`](fmt::Display).
    ///
    /// Returns `None` unless `text` is exactly 32 hex digits.
    pub fn from_hex(text: &str) -> Option<Self> {
        if text.len() != Self::HEX_LEN || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u128::from_str_radix(text, 16).ok().map(Self)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({:08x}..)", (self.0 >> 96) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        assert_eq!(
            Fingerprint::from_bytes(b"struct Foo {}"),
            Fingerprint::from_bytes(b"struct Foo {}")
        );
        assert_ne!(
            Fingerprint::from_bytes(b"struct Foo {}"),
            Fingerprint::from_bytes(b"struct Bar {}")
        );
    }

    #[test]
    fn display_is_padded_hex() {
        let fp = Fingerprint::from_u128(0xDEAD);
        assert_eq!(fp.to_string(), "0000000000000000000000000000dead");
    }

    #[test]
    fn hex_text_parses_back() {
        let fp = Fingerprint::from_bytes(b"member bar");
        assert_eq!(Fingerprint::from_hex(&fp.to_string()), Some(fp));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert_eq!(Fingerprint::from_hex("dead"), None);
        assert_eq!(Fingerprint::from_hex(&"g".repeat(32)), None);
        assert_eq!(Fingerprint::from_hex(&"+".repeat(32)), None);
    }

    #[test]
    fn stable_path_widening() {
        let id = StablePathId::from_raw(0xABCD);
        assert_eq!(Fingerprint::from_stable_path(id).as_u128(), 0xABCD);
    }

    #[test]
    fn debug_abbreviated() {
        let s = format!("{:?}", Fingerprint::from_u128(1));
        assert!(s.starts_with("Fingerprint("));
    }

    #[test]
    fn serde_roundtrip() {
        let fp = Fingerprint::from_bytes(b"serde test");
        let json = serde_json::to_string(&fp).unwrap();
        let back: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(fp, back);
    }
}
