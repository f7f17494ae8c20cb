use crate::{ast::{Expr, PostfixOperator, PrefixOperator, Program},
            error::ParseError,
            interpreter::lexer::{Lexer, Token, TokenKind}};

/// Result type used by the parser.
///
/// All parsing functions return either a parsed node or a [`ParseError`]
/// describing the first failure.
pub type ParseResult<T> = Result<T, ParseError>;

/// Operator binding strength, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// Starting precedence for a fresh expression.
    Lowest,
    /// `or`
    Or,
    /// `and`
    And,
    /// `not`
    Not,
    /// `==`, `!=`
    Equals,
    /// `<`, `>`, `<=`, `>=`
    LessGreater,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `&`
    BitAnd,
    /// `<<`, `>>`
    Shift,
    /// `+`, `-`
    Sum,
    /// `*`, `/`, `%`
    Product,
    /// `**`
    Power,
    /// Prefix operators.
    Prefix,
    /// Postfix `++`/`--`, calls, indexing, member access.
    Postfix,
}

/// Maps an infix-position token to its operator and precedence.
fn infix_operator(kind: TokenKind) -> Option<(crate::ast::InfixOperator, Precedence)> {
    use crate::ast::InfixOperator as Op;

    Some(match kind {
             TokenKind::Or => (Op::Or, Precedence::Or),
             TokenKind::And => (Op::And, Precedence::And),
             TokenKind::Eq => (Op::Eq, Precedence::Equals),
             TokenKind::NotEq => (Op::NotEq, Precedence::Equals),
             TokenKind::Lt => (Op::Lt, Precedence::LessGreater),
             TokenKind::Gt => (Op::Gt, Precedence::LessGreater),
             TokenKind::Le => (Op::Le, Precedence::LessGreater),
             TokenKind::Ge => (Op::Ge, Precedence::LessGreater),
             TokenKind::Pipe => (Op::BitOr, Precedence::BitOr),
             TokenKind::Caret => (Op::BitXor, Precedence::BitXor),
             TokenKind::Ampersand => (Op::BitAnd, Precedence::BitAnd),
             TokenKind::Lshift => (Op::Lshift, Precedence::Shift),
             TokenKind::Rshift => (Op::Rshift, Precedence::Shift),
             TokenKind::Plus => (Op::Plus, Precedence::Sum),
             TokenKind::Minus => (Op::Minus, Precedence::Sum),
             TokenKind::Asterisk => (Op::Asterisk, Precedence::Product),
             TokenKind::Slash => (Op::Slash, Precedence::Product),
             TokenKind::Mod => (Op::Mod, Precedence::Product),
             TokenKind::Power => (Op::Power, Precedence::Power),
             _ => return None,
         })
}

/// The Corvid parser.
///
/// Consumes the whole token stream up front (the lexer is lazy but finite)
/// and parses it by recursive descent, with a Pratt loop for expressions.
/// Layout tokens delimit statement boundaries and indented suites.
pub struct Parser {
    tokens: Vec<Token>,
    index:  usize,
}

impl Parser {
    /// Creates a parser by draining `lexer` to `Eof`.
    #[must_use]
    pub fn new(mut lexer: Lexer) -> Self {
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Self { tokens, index: 0 }
    }

    /// Parses the whole token stream into a program.
    ///
    /// # Errors
    /// Returns the first [`ParseError`] encountered.
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let mut statements = Vec::new();

        self.skip_newlines();
        while !self.at(TokenKind::Eof) {
            statements.push(self.parse_statement()?);
            self.skip_newlines();
        }

        Ok(Program { statements })
    }

    /// Parses one expression from a free-standing fragment, as used for
    /// the embedded parts of f-strings.
    ///
    /// # Errors
    /// Returns a [`ParseError`] if the fragment is not a single expression.
    pub fn parse_fragment(&mut self) -> ParseResult<Expr> {
        self.skip_newlines();
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.skip_newlines();
        if !self.at(TokenKind::Eof) {
            return Err(ParseError::UnexpectedToken { token:    format!("{:?}",
                                                                       self.current().kind),
                                                     position: self.current().position.clone(), });
        }
        Ok(expr)
    }

    pub(crate) fn current(&self) -> &Token {
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
        token
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    /// Consumes the current token if it has the expected kind, otherwise
    /// reports what was found.
    pub(crate) fn expect(&mut self, kind: TokenKind, expected: &str) -> ParseResult<Token> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::Expected { expected: expected.to_string(),
                                       found:    format!("{:?}", self.current().kind),
                                       position: self.current().position.clone(), })
        }
    }

    pub(crate) fn skip_newlines(&mut self) {
        while self.at(TokenKind::Newline) {
            self.advance();
        }
    }

    /// Parses an expression with the given minimum binding strength.
    pub(crate) fn parse_expression(&mut self, precedence: Precedence) -> ParseResult<Expr> {
        let mut left = self.parse_prefix()?;

        loop {
            let kind = self.current().kind;

            if matches!(kind, TokenKind::Increment | TokenKind::Decrement)
               && precedence < Precedence::Postfix
            {
                let token = self.advance();
                let operator = if token.kind == TokenKind::Increment {
                    PostfixOperator::Increment
                } else {
                    PostfixOperator::Decrement
                };
                left = Expr::Postfix { left:     Box::new(left),
                                       operator,
                                       position: token.position, };
                continue;
            }

            match kind {
                TokenKind::LParen if precedence < Precedence::Postfix => {
                    left = self.parse_call(left)?;
                    continue;
                },
                TokenKind::LBracket if precedence < Precedence::Postfix => {
                    left = self.parse_index(left)?;
                    continue;
                },
                TokenKind::Dot if precedence < Precedence::Postfix => {
                    let token = self.advance();
                    let field = self.expect(TokenKind::Ident, "a field or method name")?;
                    left = Expr::Dot { left:     Box::new(left),
                                       field:    field.literal,
                                       position: token.position, };
                    continue;
                },
                _ => {},
            }

            let Some((operator, op_precedence)) = infix_operator(kind) else {
                break;
            };
            if precedence >= op_precedence {
                break;
            }

            let token = self.advance();
            // `**` is right-associative; everything else is left.
            let right_precedence = if operator == crate::ast::InfixOperator::Power {
                Precedence::Product
            } else {
                op_precedence
            };
            let right = self.parse_expression(right_precedence)?;
            left = Expr::Infix { left:     Box::new(left),
                                 operator,
                                 right:    Box::new(right),
                                 position: token.position, };
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> ParseResult<Expr> {
        let token = self.current().clone();

        match token.kind {
            TokenKind::Int => {
                self.advance();
                let value = token.literal.parse::<i64>().map_err(|_| {
                                ParseError::InvalidNumber { literal:  token.literal.clone(),
                                                            position: token.position.clone(), }
                            })?;
                Ok(Expr::Integer { value,
                                   position: token.position })
            },
            TokenKind::Float => {
                self.advance();
                let value = token.literal.parse::<f64>().map_err(|_| {
                                ParseError::InvalidNumber { literal:  token.literal.clone(),
                                                            position: token.position.clone(), }
                            })?;
                Ok(Expr::Float { value,
                                 position: token.position })
            },
            TokenKind::Str | TokenKind::DocStr => {
                self.advance();
                Ok(Expr::Str { value:    token.literal,
                               position: token.position, })
            },
            TokenKind::FStr => {
                self.advance();
                let parts =
                    crate::interpreter::parser::fstring::split_fstring(&token.literal,
                                                                       &token.position)?;
                Ok(Expr::FString { parts,
                                   position: token.position })
            },
            TokenKind::True | TokenKind::False => {
                self.advance();
                Ok(Expr::Boolean { value:    token.kind == TokenKind::True,
                                   position: token.position, })
            },
            TokenKind::NoneKw => {
                self.advance();
                Ok(Expr::NoneLiteral { position: token.position })
            },
            // `self`, `super`, and a bare `_` reach the evaluator as plain
            // identifiers.
            TokenKind::Ident | TokenKind::SelfKw | TokenKind::Super | TokenKind::Underscore => {
                self.advance();
                Ok(Expr::Identifier { name:     token.literal,
                                      position: token.position, })
            },
            TokenKind::Minus => self.parse_prefix_operator(PrefixOperator::Minus),
            TokenKind::Bang => self.parse_prefix_operator(PrefixOperator::Bang),
            TokenKind::Tilde => self.parse_prefix_operator(PrefixOperator::Tilde),
            TokenKind::Increment => self.parse_prefix_operator(PrefixOperator::Increment),
            TokenKind::Decrement => self.parse_prefix_operator(PrefixOperator::Decrement),
            TokenKind::Not => {
                let token = self.advance();
                let right = self.parse_expression(Precedence::Not)?;
                Ok(Expr::Prefix { operator: PrefixOperator::Not,
                                  right:    Box::new(right),
                                  position: token.position, })
            },
            TokenKind::LParen => self.parse_grouped_or_tuple(),
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_hash_literal(),
            TokenKind::Eof => {
                Err(ParseError::UnexpectedEndOfInput { position: token.position })
            },
            kind => Err(ParseError::UnexpectedToken { token:    format!("{kind:?}"),
                                                      position: token.position, }),
        }
    }

    fn parse_prefix_operator(&mut self, operator: PrefixOperator) -> ParseResult<Expr> {
        let token = self.advance();
        let right = self.parse_expression(Precedence::Prefix)?;
        Ok(Expr::Prefix { operator,
                          right: Box::new(right),
                          position: token.position })
    }

    fn parse_grouped_or_tuple(&mut self) -> ParseResult<Expr> {
        let open = self.advance();

        if self.at(TokenKind::RParen) {
            self.advance();
            return Ok(Expr::Tuple { elements: Vec::new(),
                                    position: open.position, });
        }

        let first = self.parse_expression(Precedence::Lowest)?;

        if self.at(TokenKind::Comma) {
            let mut elements = vec![first];
            while self.at(TokenKind::Comma) {
                self.advance();
                if self.at(TokenKind::RParen) {
                    break;
                }
                elements.push(self.parse_expression(Precedence::Lowest)?);
            }
            self.expect(TokenKind::RParen, "')'")?;
            return Ok(Expr::Tuple { elements,
                                    position: open.position });
        }

        self.expect(TokenKind::RParen, "')'")?;
        Ok(first)
    }

    fn parse_array_literal(&mut self) -> ParseResult<Expr> {
        let open = self.advance();
        let elements = self.parse_expression_list(TokenKind::RBracket, "']'")?;
        Ok(Expr::Array { elements,
                         position: open.position })
    }

    fn parse_hash_literal(&mut self) -> ParseResult<Expr> {
        let open = self.advance();
        let mut pairs = Vec::new();

        while !self.at(TokenKind::RBrace) {
            let key = self.parse_expression(Precedence::Lowest)?;
            self.expect(TokenKind::Colon, "':'")?;
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if !self.at(TokenKind::RBrace) {
                self.expect(TokenKind::Comma, "','")?;
            }
        }
        self.expect(TokenKind::RBrace, "'}'")?;

        Ok(Expr::Hash { pairs,
                        position: open.position })
    }

    fn parse_call(&mut self, function: Expr) -> ParseResult<Expr> {
        let open = self.advance();
        let arguments = self.parse_expression_list(TokenKind::RParen, "')'")?;
        Ok(Expr::Call { function: Box::new(function),
                        arguments,
                        position: open.position })
    }

    /// Parses `left[...]`, where the brackets may hold a plain index or a
    /// `start:end` range with either side omitted.
    fn parse_index(&mut self, left: Expr) -> ParseResult<Expr> {
        let open = self.advance();

        let start = if self.at(TokenKind::Colon) {
            None
        } else {
            Some(Box::new(self.parse_expression(Precedence::Lowest)?))
        };

        let index = if self.at(TokenKind::Colon) {
            let colon = self.advance();
            let end = if self.at(TokenKind::RBracket) {
                None
            } else {
                Some(Box::new(self.parse_expression(Precedence::Lowest)?))
            };
            Expr::Range { start,
                          end,
                          position: colon.position }
        } else {
            match start {
                Some(expr) => *expr,
                None => {
                    return Err(ParseError::UnexpectedToken { token:    "']'".to_string(),
                                                             position: self.current()
                                                                           .position
                                                                           .clone(), });
                },
            }
        };

        self.expect(TokenKind::RBracket, "']'")?;
        Ok(Expr::Index { left:     Box::new(left),
                         index:    Box::new(index),
                         position: open.position, })
    }

    fn parse_expression_list(&mut self,
                             terminator: TokenKind,
                             description: &str)
                             -> ParseResult<Vec<Expr>> {
        let mut items = Vec::new();

        while !self.at(terminator) {
            items.push(self.parse_expression(Precedence::Lowest)?);
            if !self.at(terminator) {
                self.expect(TokenKind::Comma, "','")?;
            }
        }
        self.expect(terminator, description)?;

        Ok(items)
    }
}

/// Convenience helper: lexes and parses `source` in one step.
///
/// # Errors
/// Returns the first [`ParseError`] encountered.
///
/// # Example
/// ```
/// use corvid::interpreter::parser::core::parse_source;
///
/// let program = parse_source("x = 1 + 2", "").unwrap();
/// assert_eq!(program.statements.len(), 1);
/// ```
pub fn parse_source(source: &str, file_name: &str) -> ParseResult<Program> {
    Parser::new(Lexer::new(source, file_name)).parse_program()
}
