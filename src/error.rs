/// Parsing errors.
///
/// Defines all error types that can occur during lexing and parsing of
/// source code. Parse errors include unexpected tokens, malformed
/// literals, layout mistakes, and any other issues detected before
/// evaluation.
pub mod parse_error;
/// Runtime errors.
///
/// Contains the error taxonomy and the structured runtime error type
/// raised during evaluation, including positions, stack traces, source
/// context, suggestions, and the linkage that lets user-raised errors be
/// caught by grimoire or by name.
pub mod runtime_error;

pub use parse_error::ParseError;
pub use runtime_error::{ErrorKind, RuntimeError, StackTraceEntry};
