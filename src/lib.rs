//! # corvid
//!
//! corvid is a tree-walking interpreter for Corvid, a dynamically typed,
//! indentation-structured scripting language. Classes are *grimoires*,
//! methods are *spells*, and modules live in `.crl` files. The crate
//! exposes the lexer, parser, and evaluator separately for embedding, plus
//! a one-call [`run_source`] entry point.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
)]
#![allow(clippy::missing_errors_doc)]

use crate::{interpreter::{environment::Environment,
                          evaluator::core::Interpreter,
                          parser::core::parse_source,
                          value::core::Value}};

/// Defines the structure of parsed code.
///
/// This module declares the `Statement` and `Expr` enums and related types
/// that represent the syntactic structure of source code as a tree. The
/// AST is built by the parser and walked by the evaluator.
///
/// # Responsibilities
/// - Defines expression and statement types for all language constructs.
/// - Attaches source positions to AST nodes for error reporting.
/// - Renders expressions back to source-like text for diagnostics.
pub mod ast;
/// Provides unified error types for parsing and evaluation.
///
/// This module defines all errors that can be raised while lexing,
/// parsing, or evaluating code. It standardizes error reporting and
/// carries detailed information about failures, including error kinds,
/// positions, stack traces, and suggestions.
///
/// # Responsibilities
/// - Defines the parse-error enum and the structured runtime error.
/// - Attaches positions and call stacks for context.
/// - Renders the colorized multi-line error report.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together lexing, parsing, evaluation, environments,
/// value representations, and error handling to provide a complete
/// runtime for Corvid source. It exposes the public API for interpreting
/// programs.
///
/// # Responsibilities
/// - Coordinates all core components: lexer, parser, and evaluator.
/// - Provides entry points for parsing and evaluating user code.
/// - Manages the flow of data and errors between phases.
pub mod interpreter;
/// General utilities for safe numeric conversion.
///
/// Reusable helpers used throughout the evaluator, primarily checked
/// conversions between the language's `i64` surface and host-side index
/// types.
pub mod util;

/// Runs a Corvid source string to completion and returns the final value.
///
/// This is the convenience entry point: it lexes, parses, and evaluates
/// `source` in a fresh environment and session. Runtime errors come back
/// annotated with a source-context snippet.
///
/// # Errors
/// Returns an error if parsing fails or a runtime error unwinds uncaught
/// to the top of the program.
///
/// # Examples
/// ```
/// use corvid::run_source;
///
/// let result = run_source("spell add(a, b): return a + b\nadd(2, 3)", "");
/// assert_eq!(result.unwrap(), corvid::interpreter::value::core::Value::Integer(5));
///
/// // An undefined name is a runtime error.
/// assert!(run_source("y = x + 1", "").is_err());
/// ```
pub fn run_source(source: &str, file_name: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let program = parse_source(source, file_name)?;

    let env = Environment::new();
    let mut interpreter = Interpreter::new(file_name);

    match interpreter.eval_program(&program, &env) {
        Ok(value) => Ok(value),
        Err(error) => Err(Box::new(error.with_context_from_source(source, 2))),
    }
}
