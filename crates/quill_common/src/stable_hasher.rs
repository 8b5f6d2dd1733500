//! A keyed, streaming 64-bit SipHash for values that must hash identically
//! in every process.
//!
//! `std::hash` makes no promise about stability across runs or platforms, so
//! anything that ends up on disk or names a declaration across invocations is
//! hashed through [`StableHasher`] instead. Only types with a defined byte
//! representation implement [`StableHash`]: pointers and floats are left out
//! on purpose.

/// Initial SipHash state words, before seeding.
const INITIAL_STATE: [u64; 4] = [
    0x736f_6d65_7073_6575,
    0x646f_7261_6e64_6f6d,
    0x6c79_6765_6e65_7261,
    0x7465_6462_7974_6573,
];

/// Number of SipRounds applied per compressed 8-byte word.
const COMPRESSION_ROUNDS: usize = 2;

/// Number of SipRounds applied during finalization.
const FINALIZATION_ROUNDS: usize = 4;

#[derive(Clone, Copy, Debug)]
struct State {
    v0: u64,
    v1: u64,
    v2: u64,
    v3: u64,
}

impl State {
    fn seeded(left: u64, right: u64) -> Self {
        Self {
            v0: INITIAL_STATE[0] ^ left,
            v1: INITIAL_STATE[1] ^ right,
            v2: INITIAL_STATE[2] ^ left,
            v3: INITIAL_STATE[3] ^ right,
        }
    }

    fn round(&mut self) {
        self.v0 = self.v0.wrapping_add(self.v1);
        self.v1 = self.v1.rotate_left(13);
        self.v1 ^= self.v0;
        self.v0 = self.v0.rotate_left(32);
        self.v2 = self.v2.wrapping_add(self.v3);
        self.v3 = self.v3.rotate_left(16);
        self.v3 ^= self.v2;
        self.v0 = self.v0.wrapping_add(self.v3);
        self.v3 = self.v3.rotate_left(21);
        self.v3 ^= self.v0;
        self.v2 = self.v2.wrapping_add(self.v1);
        self.v1 = self.v1.rotate_left(17);
        self.v1 ^= self.v2;
        self.v2 = self.v2.rotate_left(32);
    }

    fn compress(&mut self, word: u64) {
        self.v3 ^= word;
        for _ in 0..COMPRESSION_ROUNDS {
            self.round();
        }
        self.v0 ^= word;
    }
}

/// A streaming SipHash-style hasher with a stable, documented output.
///
/// Values are folded in with [`combine`](Self::combine); bytes accumulate in
/// an 8-byte little-endian tail that is compressed every time it fills.
/// [`finalize`](Self::finalize) takes the hasher by value, so it cannot be
/// combined into after the digest has been produced.
#[derive(Clone, Debug)]
pub struct StableHasher {
    state: State,
    tail: u64,
    tail_len: u32,
    byte_count: u64,
}

impl StableHasher {
    /// Creates a hasher with both seed words set to zero.
    pub fn new() -> Self {
        Self::with_seeds(0, 0)
    }

    /// Creates a hasher keyed by two caller-supplied seed words.
    pub fn with_seeds(left: u64, right: u64) -> Self {
        Self {
            state: State::seeded(left, right),
            tail: 0,
            tail_len: 0,
            byte_count: 0,
        }
    }

    /// Folds a value into the running state.
    pub fn combine<T: StableHash + ?Sized>(&mut self, value: &T) {
        value.stable_hash(self);
    }

    /// Folds every element of an iterator into the running state.
    ///
    /// An empty range still contributes a marker so that `[]` followed by
    /// `x` differs from `x` alone.
    pub fn combine_range<'a, T, I>(&mut self, items: I)
    where
        T: StableHash + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut any = false;
        for item in items {
            item.stable_hash(self);
            any = true;
        }
        if !any {
            0i32.stable_hash(self);
        }
    }

    /// Appends raw bytes to the stream.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.tail |= u64::from(byte) << (8 * self.tail_len);
            self.tail_len += 1;
            if self.tail_len == 8 {
                self.state.compress(self.tail);
                self.tail = 0;
                self.tail_len = 0;
            }
        }
        self.byte_count = self.byte_count.wrapping_add(bytes.len() as u64);
    }

    /// Consumes the hasher and produces the final 64-bit digest.
    pub fn finalize(self) -> u64 {
        let mut state = self.state;
        state.compress(((self.byte_count & 0xff) << 56) | self.tail);
        state.v2 ^= 0xff;
        for _ in 0..FINALIZATION_ROUNDS {
            state.round();
        }
        state.v0 ^ state.v1 ^ state.v2 ^ state.v3
    }
}

impl Default for StableHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hashes a single value with an unseeded [`StableHasher`].
pub fn stable_hash_of<T: StableHash + ?Sized>(value: &T) -> u64 {
    let mut hasher = StableHasher::new();
    hasher.combine(value);
    hasher.finalize()
}

/// Types with a process-independent byte encoding for [`StableHasher`].
pub trait StableHash {
    /// Feeds this value into the hasher.
    fn stable_hash(&self, hasher: &mut StableHasher);
}

macro_rules! impl_stable_hash_for_int {
    ($($ty:ty),* $(,)?) => {
        $(
            impl StableHash for $ty {
                fn stable_hash(&self, hasher: &mut StableHasher) {
                    hasher.write_bytes(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_stable_hash_for_int!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128);

/// Implements [`StableHash`] for a fieldless enum through its discriminant.
///
/// ```
/// use quill_common::{impl_stable_hash_as, stable_hash_of};
///
/// #[derive(Clone, Copy)]
/// #[repr(u8)]
/// enum Color { Red = 0, Blue = 1 }
/// impl_stable_hash_as!(Color => u8);
///
/// assert_eq!(stable_hash_of(&Color::Blue), stable_hash_of(&1u8));
/// ```
#[macro_export]
macro_rules! impl_stable_hash_as {
    ($ty:ty => $repr:ty) => {
        impl $crate::StableHash for $ty {
            fn stable_hash(&self, hasher: &mut $crate::StableHasher) {
                hasher.combine(&(*self as $repr));
            }
        }
    };
}

// Pointer-sized integers are widened so digests agree across platforms.
impl StableHash for usize {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        (*self as u64).stable_hash(hasher);
    }
}

impl StableHash for isize {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        (*self as i64).stable_hash(hasher);
    }
}

impl StableHash for bool {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        u8::from(*self).stable_hash(hasher);
    }
}

impl StableHash for char {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        u32::from(*self).stable_hash(hasher);
    }
}

impl StableHash for str {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        hasher.combine_range(self.as_bytes());
    }
}

impl StableHash for String {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        self.as_str().stable_hash(hasher);
    }
}

impl<T: StableHash> StableHash for [T] {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        hasher.combine_range(self);
    }
}

impl<T: StableHash> StableHash for Vec<T> {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        self.as_slice().stable_hash(hasher);
    }
}

impl<T: StableHash> StableHash for Option<T> {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        match self {
            None => 0u8.stable_hash(hasher),
            Some(value) => {
                1u8.stable_hash(hasher);
                value.stable_hash(hasher);
            }
        }
    }
}

impl<T: StableHash> StableHash for std::ops::Range<T> {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        self.start.stable_hash(hasher);
        self.end.stable_hash(hasher);
    }
}

impl<T: StableHash + ?Sized> StableHash for &T {
    fn stable_hash(&self, hasher: &mut StableHasher) {
        (**self).stable_hash(hasher);
    }
}

impl StableHash for () {
    fn stable_hash(&self, _hasher: &mut StableHasher) {}
}

macro_rules! impl_stable_hash_for_tuple {
    ($($name:ident),+) => {
        impl<$($name: StableHash),+> StableHash for ($($name,)+) {
            #[allow(non_snake_case)]
            fn stable_hash(&self, hasher: &mut StableHasher) {
                let ($($name,)+) = self;
                $($name.stable_hash(hasher);)+
            }
        }
    };
}

impl_stable_hash_for_tuple!(A);
impl_stable_hash_for_tuple!(A, B);
impl_stable_hash_for_tuple!(A, B, C);
impl_stable_hash_for_tuple!(A, B, C, D);
