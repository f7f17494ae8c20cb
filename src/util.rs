/// Numeric conversion helpers.
///
/// This module provides safe functions for converting between integer
/// types without risking silent data loss. Use these helpers whenever an
/// `i64` from the language surface needs to become a host-side index or
/// shift count.
pub mod num;
