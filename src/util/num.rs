use crate::{error::{ErrorKind, RuntimeError},
            interpreter::lexer::Position};

/// Safely converts an `i64` to a `usize` if and only if it can be
/// represented exactly.
///
/// ## Errors
/// Returns a `ValueError` if the value is negative or exceeds the maximum
/// representable `usize`.
///
/// ## Example
/// ```
/// use corvid::{interpreter::lexer::Position, util::num::i64_to_usize_checked};
///
/// let position = Position::default();
/// assert_eq!(i64_to_usize_checked(42, &position).unwrap(), 42);
/// assert!(i64_to_usize_checked(-1, &position).is_err());
/// ```
pub fn i64_to_usize_checked(value: i64, position: &Position) -> Result<usize, RuntimeError> {
    usize::try_from(value).map_err(|_| {
                              RuntimeError::new(ErrorKind::Value,
                                                format!("cannot use {value} as an index"),
                                                position.clone())
                          })
}

/// Safely converts an `i64` to a `u32` shift count.
///
/// ## Errors
/// Returns a `ValueError` for negative values or values above `u32::MAX`.
pub fn i64_to_u32_checked(value: i64, position: &Position) -> Result<u32, RuntimeError> {
    u32::try_from(value).map_err(|_| {
                            RuntimeError::new(ErrorKind::Value,
                                              format!("invalid shift amount: {value}"),
                                              position.clone())
                        })
}
