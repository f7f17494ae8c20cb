/// Core parsing logic for expressions.
///
/// Contains the parser state, operator precedence, and the Pratt-style
/// expression parser covering literals, operators, calls, indexing, and
/// member access.
pub mod core;

/// Statement parsing.
///
/// Implements parsing for every statement form: assignments, definitions,
/// control flow, imports, and the simple keyword statements.
pub mod statement;

/// Block parsing.
///
/// Parses colon-introduced suites, either inline on the same line or as an
/// indented block delimited by layout tokens.
pub mod block;

/// F-string body splitting.
///
/// Splits an f-string literal into text segments and embedded expressions,
/// parsing each embedded fragment recursively.
pub mod fstring;
