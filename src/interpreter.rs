/// The evaluator module executes AST nodes and computes results.
///
/// The evaluator walks the AST recursively, producing values, dispatching
/// operators on type pairs, handling control flow through typed signals,
/// and annotating errors with positions and a call stack. It is the core
/// execution engine of the interpreter.
///
/// # Responsibilities
/// - Evaluates AST nodes, performing all supported operations.
/// - Manages environments, function calls, and grimoire dispatch.
/// - Produces runtime errors with stack traces and source positions.
pub mod evaluator;

/// The lexer module tokenizes source code for further parsing.
///
/// The lexer reads raw source text line by line and produces a stream of
/// positioned tokens, synthesizing NEWLINE, INDENT, and DEDENT tokens from
/// layout. This is the first stage of interpretation.
///
/// # Responsibilities
/// - Converts the input character stream into tokens with positions.
/// - Synthesizes layout tokens from leading whitespace.
/// - Handles string, f-string, and comment forms spanning physical lines.
pub mod lexer;

/// The parser module builds the abstract syntax tree (AST) from tokens.
///
/// The parser processes the token stream produced by the lexer and
/// constructs an AST representing the syntactic structure of statements
/// and expressions, using the layout tokens to delimit suites.
///
/// # Responsibilities
/// - Converts tokens into structured AST nodes (expressions, statements).
/// - Validates grammar, reporting errors with location info.
/// - Splits f-string bodies into text and embedded expressions.
pub mod parser;

/// The environment module implements lexical scoping.
///
/// Declares the name-to-value mapping with its outward-walking lookup and
/// local-only binding, shared by reference across closures, instances, and
/// imported modules.
pub mod environment;

/// The value module defines the runtime data types for evaluation.
///
/// This module declares all value types used during execution: scalars,
/// aggregates, functions, grimoires, instances, bound methods, namespaces,
/// and builtins, together with hashing and display support.
pub mod value;
