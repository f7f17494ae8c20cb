/// Core runtime value types.
///
/// Declares the `Value` enum covering every type a Corvid expression can
/// produce, together with truthiness, type tags, hash-key derivation, and
/// the canonical printable forms.
pub mod core;

/// Hash-key derivation for hashable values.
///
/// Defines the `(type tag, 64-bit hash)` key structure used by the hash
/// value type, with FNV-1a hashing for strings.
pub mod hash_key;

/// Grimoires, spells, and instances.
///
/// Defines the class-system runtime types: function values with captured
/// environments, grimoire templates with flattened method tables, and
/// instances with per-instance field environments.
pub mod grimoire;
