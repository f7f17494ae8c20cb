use crate::{ast::{EnsnareClause, Expr, FunctionDef, GrimoireDef, InfixOperator, MatchCase,
                  OtherwiseBranch, Parameter, Statement},
            error::ParseError,
            interpreter::{lexer::TokenKind,
                          parser::core::{ParseResult, Parser, Precedence}}};

impl Parser {
    /// Parses a single statement.
    ///
    /// Keyword-introduced statements are dispatched directly; anything
    /// else is parsed as an expression and then reinterpreted as an
    /// assignment or compound assignment when the following token says so.
    pub(crate) fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.current().kind {
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Match => self.parse_match(),
            TokenKind::Attempt => self.parse_attempt(),
            TokenKind::Raise => self.parse_raise(),
            TokenKind::Check => self.parse_check(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Import => self.parse_import(),
            TokenKind::Spell => self.parse_spell(false).map(Statement::Function),
            TokenKind::Grim => self.parse_grimoire(false),
            TokenKind::Arcane => {
                self.advance();
                self.expect(TokenKind::Grim, "'grim' after 'arcane'")?;
                self.parse_grimoire_body(true)
            },
            TokenKind::Stop => {
                let token = self.advance();
                Ok(Statement::Stop { position: token.position, })
            },
            TokenKind::Skip => {
                let token = self.advance();
                Ok(Statement::Skip { position: token.position, })
            },
            TokenKind::Ignore => {
                let token = self.advance();
                Ok(Statement::Ignore { position: token.position, })
            },
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let position = self.current().position.clone();
        let expr = self.parse_expression(Precedence::Lowest)?;

        if self.at(TokenKind::Assign) {
            if !is_assignable(&expr) {
                return Err(ParseError::InvalidAssignmentTarget { position });
            }
            self.advance();
            let value = self.parse_expression(Precedence::Lowest)?;
            return Ok(Statement::Assign { target: expr,
                                          value,
                                          position });
        }

        let compound = match self.current().kind {
            TokenKind::PlusAssign => Some(InfixOperator::Plus),
            TokenKind::MinusAssign => Some(InfixOperator::Minus),
            TokenKind::StarAssign => Some(InfixOperator::Asterisk),
            TokenKind::SlashAssign => Some(InfixOperator::Slash),
            _ => None,
        };
        if let Some(operator) = compound {
            let Expr::Identifier { name, .. } = expr else {
                return Err(ParseError::InvalidAssignmentTarget { position });
            };
            self.advance();
            let value = self.parse_expression(Precedence::Lowest)?;
            return Ok(Statement::CompoundAssign { name,
                                                  operator,
                                                  value,
                                                  position });
        }

        Ok(Statement::Expression { expr, position })
    }

    fn parse_if(&mut self) -> ParseResult<Statement> {
        let token = self.advance();
        let condition = self.parse_expression(Precedence::Lowest)?;
        let consequence = self.parse_block()?;

        let mut otherwise = Vec::new();
        loop {
            self.skip_newlines();
            if !self.at(TokenKind::Otherwise) {
                break;
            }
            self.advance();
            let branch_condition = self.parse_expression(Precedence::Lowest)?;
            let branch_consequence = self.parse_block()?;
            otherwise.push(OtherwiseBranch { condition:   branch_condition,
                                             consequence: branch_consequence, });
        }

        let alternative = if self.at(TokenKind::Else) {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Statement::If { condition,
                           consequence,
                           otherwise,
                           alternative,
                           position: token.position })
    }

    fn parse_while(&mut self) -> ParseResult<Statement> {
        let token = self.advance();
        let condition = self.parse_expression(Precedence::Lowest)?;
        let body = self.parse_block()?;
        Ok(Statement::While { condition,
                              body,
                              position: token.position })
    }

    fn parse_for(&mut self) -> ParseResult<Statement> {
        let token = self.advance();
        let variable = self.parse_expression(Precedence::Lowest)?;
        self.expect(TokenKind::In, "'in'")?;
        let iterable = self.parse_expression(Precedence::Lowest)?;
        let body = self.parse_block()?;

        self.skip_newlines();
        let alternative = if self.at(TokenKind::Else) {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Statement::For { variable,
                            iterable,
                            body,
                            alternative,
                            position: token.position })
    }

    fn parse_match(&mut self) -> ParseResult<Statement> {
        let token = self.advance();
        let value = self.parse_expression(Precedence::Lowest)?;

        self.expect(TokenKind::Colon, "':'")?;
        self.skip_newlines();
        if !self.at(TokenKind::Indent) {
            return Err(ParseError::ExpectedIndent { position: self.current().position.clone(), });
        }
        self.advance();

        let mut cases = Vec::new();
        let mut default = None;

        self.skip_newlines();
        while !self.at(TokenKind::Dedent) && !self.at(TokenKind::Eof) {
            self.expect(TokenKind::Case, "'case'")?;

            if self.at(TokenKind::Underscore) {
                self.advance();
                default = Some(self.parse_block()?);
            } else {
                let condition = self.parse_expression(Precedence::Lowest)?;
                let body = self.parse_block()?;
                cases.push(MatchCase { condition, body });
            }
            self.skip_newlines();
        }
        if self.at(TokenKind::Dedent) {
            self.advance();
        }

        Ok(Statement::Match { value,
                              cases,
                              default,
                              position: token.position })
    }

    fn parse_attempt(&mut self) -> ParseResult<Statement> {
        let token = self.advance();
        let try_block = self.parse_block()?;

        let mut ensnare = Vec::new();
        loop {
            self.skip_newlines();
            if !self.at(TokenKind::Ensnare) {
                break;
            }
            self.advance();
            let condition = self.parse_expression(Precedence::Lowest)?;
            let body = self.parse_block()?;
            ensnare.push(EnsnareClause { condition, body });
        }

        let resolve_block = if self.at(TokenKind::Resolve) {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Statement::Attempt { try_block,
                                ensnare,
                                resolve_block,
                                position: token.position })
    }

    fn parse_raise(&mut self) -> ParseResult<Statement> {
        let token = self.advance();
        let error = self.parse_expression(Precedence::Lowest)?;
        Ok(Statement::Raise { error,
                              position: token.position })
    }

    fn parse_check(&mut self) -> ParseResult<Statement> {
        let token = self.advance();
        let condition = self.parse_expression(Precedence::Lowest)?;

        let message = if self.at(TokenKind::Comma) {
            self.advance();
            Some(self.parse_expression(Precedence::Lowest)?)
        } else {
            None
        };

        Ok(Statement::Check { condition,
                              message,
                              position: token.position })
    }

    fn parse_return(&mut self) -> ParseResult<Statement> {
        let token = self.advance();

        let value = if matches!(self.current().kind,
                                TokenKind::Newline | TokenKind::Dedent | TokenKind::Eof)
        {
            None
        } else {
            Some(self.parse_expression(Precedence::Lowest)?)
        };

        Ok(Statement::Return { value,
                               position: token.position })
    }

    fn parse_import(&mut self) -> ParseResult<Statement> {
        let token = self.advance();
        let path = self.expect(TokenKind::Str, "a module path string")?;

        let alias = if self.at(TokenKind::As) {
            self.advance();
            Some(self.expect(TokenKind::Ident, "an alias name")?.literal)
        } else {
            None
        };

        Ok(Statement::Import { path: path.literal,
                               alias,
                               position: token.position })
    }

    /// Parses a spell definition. The `spell`/`arcanespell` keyword is
    /// still current when this is called.
    fn parse_spell(&mut self, is_arcane: bool) -> ParseResult<FunctionDef> {
        let token = self.advance();
        let name = self.expect(TokenKind::Ident, "a spell name")?.literal;
        let parameters = self.parse_parameters()?;
        let body = self.parse_block()?;

        Ok(FunctionDef { name,
                         parameters,
                         body,
                         is_arcane,
                         position: token.position })
    }

    fn parse_parameters(&mut self) -> ParseResult<Vec<Parameter>> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut parameters = Vec::new();

        while !self.at(TokenKind::RParen) {
            let name = match self.current().kind {
                TokenKind::Ident | TokenKind::SelfKw => self.advance().literal,
                _ => {
                    return Err(ParseError::Expected { expected: "a parameter name".to_string(),
                                                      found:    format!("{:?}",
                                                                        self.current().kind),
                                                      position: self.current().position.clone(), });
                },
            };

            let default = if self.at(TokenKind::Assign) {
                self.advance();
                Some(self.parse_expression(Precedence::Lowest)?)
            } else {
                None
            };

            parameters.push(Parameter { name, default });
            if !self.at(TokenKind::RParen) {
                self.expect(TokenKind::Comma, "','")?;
            }
        }
        self.expect(TokenKind::RParen, "')'")?;

        Ok(parameters)
    }

    fn parse_grimoire(&mut self, is_arcane: bool) -> ParseResult<Statement> {
        self.advance();
        self.parse_grimoire_body(is_arcane)
    }

    /// Parses a grimoire definition from just after the `grim` keyword.
    fn parse_grimoire_body(&mut self, is_arcane: bool) -> ParseResult<Statement> {
        let name_token = self.expect(TokenKind::Ident, "a grimoire name")?;
        let position = name_token.position.clone();

        let inherits = if self.at(TokenKind::LParen) {
            self.advance();
            let parent = self.expect(TokenKind::Ident, "a parent grimoire name")?.literal;
            self.expect(TokenKind::RParen, "')'")?;
            Some(parent)
        } else {
            None
        };

        self.expect(TokenKind::Colon, "':'")?;
        self.skip_newlines();
        if !self.at(TokenKind::Indent) {
            return Err(ParseError::ExpectedIndent { position: self.current().position.clone(), });
        }
        self.advance();

        let mut init = None;
        let mut methods = Vec::new();

        self.skip_newlines();
        while !self.at(TokenKind::Dedent) && !self.at(TokenKind::Eof) {
            match self.current().kind {
                // A leading docstring documents the grimoire; it carries
                // no runtime behavior.
                TokenKind::DocStr => {
                    self.advance();
                },
                TokenKind::Init => {
                    let token = self.advance();
                    let parameters = self.parse_parameters()?;
                    let body = self.parse_block()?;
                    init = Some(FunctionDef { name: "init".to_string(),
                                              parameters,
                                              body,
                                              is_arcane: false,
                                              position: token.position });
                },
                TokenKind::Spell => methods.push(self.parse_spell(false)?),
                TokenKind::ArcaneSpell => methods.push(self.parse_spell(true)?),
                kind => {
                    return Err(ParseError::UnexpectedToken { token:    format!("{kind:?}"),
                                                             position: self.current()
                                                                           .position
                                                                           .clone(), });
                },
            }
            self.skip_newlines();
        }
        if self.at(TokenKind::Dedent) {
            self.advance();
        }

        Ok(Statement::Grimoire(GrimoireDef { name: name_token.literal,
                                             inherits,
                                             init,
                                             methods,
                                             is_arcane,
                                             position }))
    }
}

/// Whether an expression form is a legal assignment target.
const fn is_assignable(expr: &Expr) -> bool {
    matches!(expr,
             Expr::Identifier { .. }
             | Expr::Dot { .. }
             | Expr::Index { .. }
             | Expr::Tuple { .. })
}
