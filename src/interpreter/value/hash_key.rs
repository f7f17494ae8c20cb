/// The type tag half of a hash key.
///
/// Only these three value types are hashable; keeping the tag in the key
/// guarantees that equal hashes for, say, `Integer(1)` and `Boolean(true)`
/// can never collide across types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashKind {
    /// An integer key.
    Integer,
    /// A boolean key.
    Boolean,
    /// A string key.
    Str,
}

/// A hash-map key derived from a hashable value: a type tag plus a 64-bit
/// hash. Stable across runs.
///
/// # Example
/// ```
/// use corvid::interpreter::value::{core::Value, hash_key::HashKey};
///
/// let a = Value::Str("Hello World".to_string()).hash_key().unwrap();
/// let b = Value::Str("Hello World".to_string()).hash_key().unwrap();
/// let c = Value::Str("something else".to_string()).hash_key().unwrap();
///
/// assert_eq!(a, b);
/// assert_ne!(a, c);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    /// The type tag of the hashed value.
    pub kind:  HashKind,
    /// The 64-bit hash.
    pub value: u64,
}

impl HashKey {
    /// Builds the key for an integer value.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn integer(value: i64) -> Self {
        Self { kind:  HashKind::Integer,
               value: value as u64, }
    }

    /// Builds the key for a boolean value.
    #[must_use]
    pub const fn boolean(value: bool) -> Self {
        Self { kind:  HashKind::Boolean,
               value: if value { 1 } else { 0 }, }
    }

    /// Builds the key for a string value, hashing its UTF-8 bytes with
    /// FNV-1a.
    #[must_use]
    pub fn string(value: &str) -> Self {
        Self { kind:  HashKind::Str,
               value: fnv1a(value.as_bytes()), }
    }
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a over a byte slice.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}
