use std::{collections::HashMap, rc::Rc};

use crate::interpreter::{lexer::Position, value::{core::Value, grimoire::Grimoire}};

const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// The fixed taxonomy of runtime error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A generic runtime failure.
    Runtime,
    /// A syntax problem surfacing at evaluation time.
    Syntax,
    /// A value had an unexpected or incompatible type.
    Type,
    /// A reference could not be resolved.
    Reference,
    /// A module import failed.
    Import,
    /// An index was outside the valid range.
    Index,
    /// An attribute or method was not found.
    Attribute,
    /// An identifier was not found.
    Name,
    /// A value was malformed for the requested operation.
    Value,
    /// Arithmetic overflowed.
    Overflow,
    /// A `check` assertion failed.
    Assertion,
    /// A declared but unimplemented operation was invoked.
    NotImplemented,
    /// Division (or modulo) by zero.
    DivisionByZero,
    /// A user-raised error carrying its own name.
    Custom,
}

impl ErrorKind {
    /// The canonical name of this error kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Runtime => "RuntimeError",
            Self::Syntax => "SyntaxError",
            Self::Type => "TypeError",
            Self::Reference => "ReferenceError",
            Self::Import => "ImportError",
            Self::Index => "IndexError",
            Self::Attribute => "AttributeError",
            Self::Name => "NameError",
            Self::Value => "ValueError",
            Self::Overflow => "OverflowError",
            Self::Assertion => "AssertionError",
            Self::NotImplemented => "NotImplementedError",
            Self::DivisionByZero => "DivisionByZeroError",
            Self::Custom => "Error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A single entry in a stack trace.
#[derive(Debug, Clone, PartialEq)]
pub struct StackTraceEntry {
    /// The function name, or empty for top-level code.
    pub function: String,
    /// The call-site position.
    pub position: Position,
    /// Rendered argument values, when captured.
    pub args:     Option<Vec<String>>,
    /// A context code snippet, when captured.
    pub context:  Option<String>,
}

impl StackTraceEntry {
    /// Creates an entry without argument or context detail.
    #[must_use]
    pub const fn new(function: String, position: Position) -> Self {
        Self { function,
               position,
               args: None,
               context: None }
    }
}

/// A structured runtime error.
///
/// Every error records the position of the offending node and the call
/// stack at creation time. User-raised errors additionally carry the name
/// they were raised under, the grimoire they belong to (for `ensnare`
/// matching by identity), the raising instance, and a details map.
///
/// The `Display` form is the full multi-line report: colorized kind and
/// message, location, optional source context with a caret, the stack
/// trace (most recent call last), and any suggestions.
#[derive(Debug, Clone)]
pub struct RuntimeError {
    /// The taxonomy kind.
    pub kind:        ErrorKind,
    /// The reported name: the kind name, or the raising grimoire's name.
    pub name:        String,
    /// The error message.
    pub message:     String,
    /// Where the error occurred.
    pub position:    Position,
    /// The call stack at creation time, oldest first.
    pub stack_trace: Vec<StackTraceEntry>,
    /// Suggestions shown at the end of the report.
    pub suggestions: Vec<String>,
    /// Source lines around the error, when available.
    pub context:     Option<String>,
    /// Additional key/value details for user-raised errors.
    pub details:     HashMap<String, Value>,
    /// The grimoire a user-raised error belongs to.
    pub class:       Option<Rc<Grimoire>>,
    /// The raising instance, if the error came from `raise instance`.
    pub instance:    Option<Value>,
}

impl RuntimeError {
    /// Creates an error of the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>, position: Position) -> Self {
        Self { kind,
               name: kind.name().to_string(),
               message: message.into(),
               position,
               stack_trace: Vec::new(),
               suggestions: Vec::new(),
               context: None,
               details: HashMap::new(),
               class: None,
               instance: None }
    }

    /// Creates a user-raised error with its own name.
    #[must_use]
    pub fn custom(name: impl Into<String>, message: impl Into<String>, position: Position) -> Self {
        let mut error = Self::new(ErrorKind::Custom, message, position);
        error.name = name.into();
        error
    }

    /// Creates an error with suggestions appropriate to its kind.
    #[must_use]
    pub fn smart(kind: ErrorKind, message: impl Into<String>, position: Position) -> Self {
        let mut error = Self::new(kind, message, position);
        match kind {
            ErrorKind::Name => {
                error.suggestions.extend(["Check if the variable is defined before use".to_string(),
                                          "Verify the variable name is spelled correctly".to_string()]);
            },
            ErrorKind::Import => {
                error.suggestions.extend(["Verify the import path is correct".to_string(),
                                          "Check that the imported file exists".to_string()]);
            },
            ErrorKind::Attribute => {
                error.suggestions.push("Verify that the object has the attribute or method \
                                        you're trying to access"
                                                               .to_string());
            },
            ErrorKind::Index => {
                error.suggestions.extend(["Verify that the index is within the bounds of the \
                                           collection"
                                                      .to_string(),
                                          "Check for off-by-one errors in loop bounds".to_string()]);
            },
            _ => {},
        }
        error
    }

    /// Appends a stack trace entry.
    pub fn add_stack_entry(&mut self, function: impl Into<String>, position: Position) {
        self.stack_trace.push(StackTraceEntry::new(function.into(), position));
    }

    /// Attaches source context to the report.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Adds a key/value pair to the error's details.
    pub fn add_detail(&mut self, key: impl Into<String>, value: Value) {
        self.details.insert(key.into(), value);
    }

    /// Extracts a context snippet around `position` from `source` and
    /// attaches it to the error.
    #[must_use]
    pub fn with_context_from_source(self, source: &str, context_lines: usize) -> Self {
        if source.is_empty() || self.position.line == 0 {
            return self;
        }

        let lines: Vec<&str> = source.split('\n').collect();
        if self.position.line > lines.len() {
            return self;
        }

        // The snippet ends at the error line so the caret lands on the
        // last line of the context block.
        let start = (self.position.line - 1).saturating_sub(context_lines);
        let snippet = lines[start..self.position.line].join("\n");
        self.with_context(snippet)
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{RED}{}{RESET}: {}", self.name, self.message)?;

        if !self.details.is_empty() {
            let mut rendered: Vec<String> =
                self.details.iter().map(|(k, v)| format!("{k}: {v}")).collect();
            rendered.sort();
            writeln!(f, "  ({})", rendered.join(", "))?;
        }

        if self.position.line > 0 {
            writeln!(f,
                     "  at {CYAN}{}{RESET}:{YELLOW}{}{RESET}:{YELLOW}{}{RESET}",
                     self.position.file, self.position.line, self.position.column)?;
        }

        if let Some(context) = &self.context {
            writeln!(f, "\nCode context:")?;
            let lines: Vec<&str> = context.split('\n').collect();
            for (index, line) in lines.iter().enumerate() {
                let line_number = (self.position.line + 1 + index).saturating_sub(lines.len());
                if line_number == self.position.line {
                    writeln!(f, "  {YELLOW}{line_number}{RESET} | {RED}{line}{RESET}")?;
                    writeln!(f,
                             "     | {}{RED}^{RESET}",
                             " ".repeat(self.position.column.saturating_sub(1)))?;
                } else {
                    writeln!(f, "  {YELLOW}{line_number}{RESET} | {line}")?;
                }
            }
        }

        if !self.stack_trace.is_empty() {
            writeln!(f, "\nStack trace (most recent call last):")?;
            // Entries are pushed oldest-first, which is already the order
            // the header promises.
            for entry in &self.stack_trace {
                let function = if entry.function.is_empty() {
                    "<module>"
                } else {
                    entry.function.as_str()
                };
                let args = entry.args
                                .as_ref()
                                .map_or_else(String::new, |args| format!("({})", args.join(", ")));
                writeln!(f,
                         "  at {CYAN}{function}{args}{RESET} in {CYAN}{}{RESET}:{YELLOW}{}{RESET}:{YELLOW}{}{RESET}",
                         entry.position.file, entry.position.line, entry.position.column)?;
                if let Some(context) = &entry.context {
                    for line in context.split('\n') {
                        writeln!(f, "    | {line}")?;
                    }
                }
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                writeln!(f, "  - {suggestion}")?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for RuntimeError {}
