use crate::interpreter::lexer::Position;

#[derive(Debug, Clone, PartialEq)]
/// Represents all errors that can occur during lexing or parsing.
pub enum ParseError {
    /// Found an unexpected token while parsing.
    UnexpectedToken {
        /// A description of the token encountered.
        token:    String,
        /// The source position where the error occurred.
        position: Position,
    },
    /// A specific token was expected but something else was found.
    Expected {
        /// What the parser was looking for.
        expected: String,
        /// What it found instead.
        found:    String,
        /// The source position where the error occurred.
        position: Position,
    },
    /// Reached the end of input unexpectedly.
    UnexpectedEndOfInput {
        /// The source position where the error occurred.
        position: Position,
    },
    /// A numeric literal could not be represented.
    InvalidNumber {
        /// The literal text.
        literal:  String,
        /// The source position where the error occurred.
        position: Position,
    },
    /// An indented suite was expected but not found.
    ExpectedIndent {
        /// The source position where the error occurred.
        position: Position,
    },
    /// The left side of an assignment is not assignable.
    InvalidAssignmentTarget {
        /// The source position where the error occurred.
        position: Position,
    },
    /// An f-string has unbalanced `{`/`}` braces.
    UnbalancedFString {
        /// The source position where the error occurred.
        position: Position,
    },
    /// The lexer produced a character matching no rule.
    IllegalCharacter {
        /// The offending character.
        character: String,
        /// The source position where the error occurred.
        position:  Position,
    },
}

impl ParseError {
    /// Gets the source position from `self`.
    #[must_use]
    pub const fn position(&self) -> &Position {
        match self {
            Self::UnexpectedToken { position, .. }
            | Self::Expected { position, .. }
            | Self::UnexpectedEndOfInput { position }
            | Self::InvalidNumber { position, .. }
            | Self::ExpectedIndent { position }
            | Self::InvalidAssignmentTarget { position }
            | Self::UnbalancedFString { position }
            | Self::IllegalCharacter { position, .. } => position,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedToken { token, position } => {
                write!(f, "Syntax error at {position}: Unexpected token {token}.")
            },
            Self::Expected { expected, found, position } => {
                write!(f, "Syntax error at {position}: Expected {expected}, got {found}.")
            },
            Self::UnexpectedEndOfInput { position } => {
                write!(f, "Syntax error at {position}: Unexpected end of input.")
            },
            Self::InvalidNumber { literal, position } => {
                write!(f, "Syntax error at {position}: Invalid numeric literal '{literal}'.")
            },
            Self::ExpectedIndent { position } => {
                write!(f, "Syntax error at {position}: Expected an indented block.")
            },
            Self::InvalidAssignmentTarget { position } => {
                write!(f, "Syntax error at {position}: Invalid assignment target.")
            },
            Self::UnbalancedFString { position } => {
                write!(f, "Syntax error at {position}: Unbalanced braces in f-string.")
            },
            Self::IllegalCharacter { character, position } => {
                write!(f, "Syntax error at {position}: Illegal character '{character}'.")
            },
        }
    }
}

impl std::error::Error for ParseError {}
