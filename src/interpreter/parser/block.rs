use crate::{ast::Block,
            error::ParseError,
            interpreter::{lexer::TokenKind,
                          parser::core::{ParseResult, Parser}}};

impl Parser {
    /// Parses a colon-introduced suite.
    ///
    /// Two forms are accepted:
    /// - an inline suite, a single statement on the same line
    ///   (`spell inc(x): return x + 1`);
    /// - an indented suite: a newline, an `Indent`, one or more
    ///   statements, and the matching `Dedent`.
    pub(crate) fn parse_block(&mut self) -> ParseResult<Block> {
        self.expect(TokenKind::Colon, "':'")?;

        if !self.at(TokenKind::Newline) {
            let statement = self.parse_statement()?;
            return Ok(Block { statements: vec![statement], });
        }

        self.skip_newlines();
        if !self.at(TokenKind::Indent) {
            return Err(ParseError::ExpectedIndent { position: self.current().position.clone(), });
        }
        self.advance();

        self.parse_suite_body()
    }

    /// Parses statements up to (and consuming) the suite's `Dedent`.
    pub(crate) fn parse_suite_body(&mut self) -> ParseResult<Block> {
        let mut statements = Vec::new();

        self.skip_newlines();
        while !self.at(TokenKind::Dedent) && !self.at(TokenKind::Eof) {
            statements.push(self.parse_statement()?);
            self.skip_newlines();
        }
        if self.at(TokenKind::Dedent) {
            self.advance();
        }

        Ok(Block { statements })
    }
}
