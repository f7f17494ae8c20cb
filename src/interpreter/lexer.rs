/// A location in the source text.
///
/// Positions are attached to every token, carried into AST nodes, and
/// reported in error messages and stack traces. Lines and columns are
/// 1-based; a default position (line 0) means "no location available".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Position {
    /// Name of the source file, or empty for inline scripts.
    pub file:   String,
    /// 1-based line number.
    pub line:   usize,
    /// 1-based column number.
    pub column: usize,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.file.is_empty() {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(f, "{}:{}:{}", self.file, self.line, self.column)
        }
    }
}

/// The kind of a lexical token.
///
/// Covers literals, identifiers, keywords, operators, punctuation, the
/// synthetic layout tokens (`Newline`, `Indent`, `Dedent`) and `Eof`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A character that matches no lexical rule.
    Illegal,
    /// End of input. Returned indefinitely once reached.
    Eof,

    /// An identifier such as `x` or `total_count`.
    Ident,
    /// An integer literal.
    Int,
    /// A floating-point literal.
    Float,
    /// A single-line string literal.
    Str,
    /// A triple-quoted string literal spanning physical lines.
    DocStr,
    /// An f-string literal; the parser splits its body further.
    FStr,

    /// `=`
    Assign,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Asterisk,
    /// `/`
    Slash,
    /// `%`
    Mod,
    /// `**`
    Power,
    /// `+=`
    PlusAssign,
    /// `-=`
    MinusAssign,
    /// `*=`
    StarAssign,
    /// `/=`
    SlashAssign,
    /// `++`
    Increment,
    /// `--`
    Decrement,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `<<`
    Lshift,
    /// `>>`
    Rshift,
    /// `!`
    Bang,
    /// `~`
    Tilde,
    /// `^`
    Caret,
    /// `&`
    Ampersand,
    /// `|`
    Pipe,
    /// `@`
    At,
    /// `#`
    Hash,
    /// `_` standing alone, as in a `match` default case.
    Underscore,

    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `.`
    Dot,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `{`
    LBrace,
    /// `}`
    RBrace,

    /// End of a logical line.
    Newline,
    /// Increase in indentation depth.
    Indent,
    /// Decrease in indentation depth.
    Dedent,

    /// `spell`
    Spell,
    /// `grim`
    Grim,
    /// `arcane`
    Arcane,
    /// `arcanespell`
    ArcaneSpell,
    /// `init`
    Init,
    /// `self`
    SelfKw,
    /// `super`
    Super,
    /// `if`
    If,
    /// `otherwise`
    Otherwise,
    /// `else`
    Else,
    /// `while`
    While,
    /// `for`
    For,
    /// `in`
    In,
    /// `match`
    Match,
    /// `case`
    Case,
    /// `attempt`
    Attempt,
    /// `ensnare`
    Ensnare,
    /// `resolve`
    Resolve,
    /// `raise`
    Raise,
    /// `check`
    Check,
    /// `return`
    Return,
    /// `stop`
    Stop,
    /// `skip`
    Skip,
    /// `ignore`
    Ignore,
    /// `import`
    Import,
    /// `as`
    As,
    /// `and`
    And,
    /// `or`
    Or,
    /// `not`
    Not,
    /// `True`
    True,
    /// `False`
    False,
    /// `None`
    NoneKw,
}

/// Looks up an identifier in the keyword table.
///
/// Returns the keyword token kind, or `TokenKind::Ident` when the name is
/// not a keyword.
#[must_use]
pub fn lookup_keyword(ident: &str) -> TokenKind {
    match ident {
        "spell" => TokenKind::Spell,
        "grim" => TokenKind::Grim,
        "arcane" => TokenKind::Arcane,
        "arcanespell" => TokenKind::ArcaneSpell,
        "init" => TokenKind::Init,
        "self" => TokenKind::SelfKw,
        "super" => TokenKind::Super,
        "if" => TokenKind::If,
        "otherwise" => TokenKind::Otherwise,
        "else" => TokenKind::Else,
        "while" => TokenKind::While,
        "for" => TokenKind::For,
        "in" => TokenKind::In,
        "match" => TokenKind::Match,
        "case" => TokenKind::Case,
        "attempt" => TokenKind::Attempt,
        "ensnare" => TokenKind::Ensnare,
        "resolve" => TokenKind::Resolve,
        "raise" => TokenKind::Raise,
        "check" => TokenKind::Check,
        "return" => TokenKind::Return,
        "stop" => TokenKind::Stop,
        "skip" => TokenKind::Skip,
        "ignore" => TokenKind::Ignore,
        "import" => TokenKind::Import,
        "as" => TokenKind::As,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        "True" => TokenKind::True,
        "False" => TokenKind::False,
        "None" => TokenKind::NoneKw,
        _ => TokenKind::Ident,
    }
}

/// A lexical token: kind, literal text, and source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What sort of token this is.
    pub kind:     TokenKind,
    /// The literal text (or decoded content, for string-like tokens).
    pub literal:  String,
    /// Where the token starts in the source.
    pub position: Position,
}

impl Token {
    fn new(kind: TokenKind, literal: impl Into<String>, position: Position) -> Self {
        Self { kind,
               literal: literal.into(),
               position }
    }
}

/// The Corvid lexer.
///
/// Scans source text line by line, producing tokens on demand through
/// [`Lexer::next_token`]. Layout tokens are synthesized from leading
/// whitespace: each physical line is measured once (space = 1 column,
/// tab = 4) against an indent stack, emitting `Indent` on an increase and
/// one `Dedent` per popped level on a decrease. A dedent does not consume
/// input; successive calls keep reconciling against the stored
/// measurement until the stack top matches, at which point a `Newline` is
/// emitted. Lines continuing at an unchanged depth are separated only by
/// the previous line's trailing `Newline`. Pending dedents are flushed
/// before the final `Eof`.
///
/// # Example
/// ```
/// use corvid::interpreter::lexer::{Lexer, TokenKind};
///
/// let mut lexer = Lexer::new("x = 1", "");
/// assert_eq!(lexer.next_token().kind, TokenKind::Newline);
/// assert_eq!(lexer.next_token().kind, TokenKind::Ident);
/// assert_eq!(lexer.next_token().kind, TokenKind::Assign);
/// assert_eq!(lexer.next_token().kind, TokenKind::Int);
/// ```
pub struct Lexer {
    lines:        Vec<Vec<char>>,
    line_index:   usize,
    char_index:   usize,
    indent_stack: Vec<usize>,
    finished:     bool,
    file_name:    String,

    /// Indent measured for the current line, held while dedents are emitted.
    pending_indent:  Option<usize>,
    indent_resolved: bool,
}

impl Lexer {
    /// Creates a lexer over `input`, attributing positions to `file_name`.
    #[must_use]
    pub fn new(input: &str, file_name: &str) -> Self {
        let lines: Vec<Vec<char>> = input.split('\n').map(|l| l.chars().collect()).collect();
        let finished = lines.is_empty();

        Self { lines,
               line_index: 0,
               char_index: 0,
               indent_stack: vec![0],
               finished,
               file_name: file_name.to_string(),
               pending_indent: None,
               indent_resolved: false }
    }

    /// Returns the next token. After the last real token, pending dedents
    /// are drained and then `Eof` is returned indefinitely.
    pub fn next_token(&mut self) -> Token {
        if self.finished {
            if self.indent_stack.len() > 1 {
                self.indent_stack.pop();
                return Token::new(TokenKind::Dedent, "", self.position());
            }
            return Token::new(TokenKind::Eof, "", self.position());
        }

        if self.char_index == 0 && !self.indent_resolved {
            return self.handle_indent_change();
        }

        if self.char_index >= self.curr_line_len() {
            let tok = Token::new(TokenKind::Newline, "\\n", self.position());
            self.advance_line();
            return tok;
        }

        let ch = self.curr_char();

        if ch == ' ' || ch == '\t' {
            self.char_index += 1;
            return self.next_token();
        }

        if ch == 'f' {
            let next = self.peek_char();
            if next == Some('"') || next == Some('\'') {
                self.char_index += 1;
                return self.read_fstring();
            }
            return self.read_identifier();
        }

        let position = self.position();

        match ch {
            '=' => {
                if self.peek_char() == Some('=') {
                    self.char_index += 2;
                    Token::new(TokenKind::Eq, "==", position)
                } else {
                    self.char_index += 1;
                    Token::new(TokenKind::Assign, "=", position)
                }
            },
            '+' => match self.peek_char() {
                Some('+') => {
                    self.char_index += 2;
                    Token::new(TokenKind::Increment, "++", position)
                },
                Some('=') => {
                    self.char_index += 2;
                    Token::new(TokenKind::PlusAssign, "+=", position)
                },
                _ => {
                    self.char_index += 1;
                    Token::new(TokenKind::Plus, "+", position)
                },
            },
            '-' => match self.peek_char() {
                Some('-') => {
                    self.char_index += 2;
                    Token::new(TokenKind::Decrement, "--", position)
                },
                Some('=') => {
                    self.char_index += 2;
                    Token::new(TokenKind::MinusAssign, "-=", position)
                },
                _ => {
                    self.char_index += 1;
                    Token::new(TokenKind::Minus, "-", position)
                },
            },
            '*' => match self.peek_char() {
                Some('=') => {
                    self.char_index += 2;
                    Token::new(TokenKind::StarAssign, "*=", position)
                },
                Some('*') => {
                    self.char_index += 2;
                    Token::new(TokenKind::Power, "**", position)
                },
                _ => {
                    self.char_index += 1;
                    Token::new(TokenKind::Asterisk, "*", position)
                },
            },
            '/' => match self.peek_char() {
                Some('=') => {
                    self.char_index += 2;
                    Token::new(TokenKind::SlashAssign, "/=", position)
                },
                Some('/') => {
                    self.char_index = self.curr_line_len();
                    self.next_token()
                },
                Some('*') => {
                    self.skip_block_comment();
                    self.next_token()
                },
                _ => {
                    self.char_index += 1;
                    Token::new(TokenKind::Slash, "/", position)
                },
            },
            '<' => match self.peek_char() {
                Some('<') => {
                    self.char_index += 2;
                    Token::new(TokenKind::Lshift, "<<", position)
                },
                Some('=') => {
                    self.char_index += 2;
                    Token::new(TokenKind::Le, "<=", position)
                },
                _ => {
                    self.char_index += 1;
                    Token::new(TokenKind::Lt, "<", position)
                },
            },
            '>' => match self.peek_char() {
                Some('>') => {
                    self.char_index += 2;
                    Token::new(TokenKind::Rshift, ">>", position)
                },
                Some('=') => {
                    self.char_index += 2;
                    Token::new(TokenKind::Ge, ">=", position)
                },
                _ => {
                    self.char_index += 1;
                    Token::new(TokenKind::Gt, ">", position)
                },
            },
            '!' => {
                if self.peek_char() == Some('=') {
                    self.char_index += 2;
                    Token::new(TokenKind::NotEq, "!=", position)
                } else {
                    self.char_index += 1;
                    Token::new(TokenKind::Bang, "!", position)
                }
            },
            '_' => {
                if self.peek_char().is_some_and(|c| is_letter_or_digit(c) || c == '_') {
                    self.read_identifier()
                } else {
                    self.char_index += 1;
                    Token::new(TokenKind::Underscore, "_", position)
                }
            },
            '%' => self.single(TokenKind::Mod, "%", position),
            '~' => self.single(TokenKind::Tilde, "~", position),
            '^' => self.single(TokenKind::Caret, "^", position),
            '&' => self.single(TokenKind::Ampersand, "&", position),
            '|' => self.single(TokenKind::Pipe, "|", position),
            '@' => self.single(TokenKind::At, "@", position),
            '#' => self.single(TokenKind::Hash, "#", position),
            ',' => self.single(TokenKind::Comma, ",", position),
            ':' => self.single(TokenKind::Colon, ":", position),
            ';' => self.single(TokenKind::Semicolon, ";", position),
            '.' => self.single(TokenKind::Dot, ".", position),
            '(' => self.single(TokenKind::LParen, "(", position),
            ')' => self.single(TokenKind::RParen, ")", position),
            '[' => self.single(TokenKind::LBracket, "[", position),
            ']' => self.single(TokenKind::RBracket, "]", position),
            '{' => self.single(TokenKind::LBrace, "{", position),
            '}' => self.single(TokenKind::RBrace, "}", position),
            '"' | '\'' => self.read_string(),
            c if is_letter(c) => self.read_identifier(),
            c if c.is_ascii_digit() => self.read_number(),
            c => {
                self.char_index += 1;
                Token::new(TokenKind::Illegal, c.to_string(), position)
            },
        }
    }

    fn single(&mut self, kind: TokenKind, literal: &str, position: Position) -> Token {
        self.char_index += 1;
        Token::new(kind, literal, position)
    }

    fn position(&self) -> Position {
        Position { file:   self.file_name.clone(),
                   line:   self.line_index + 1,
                   column: self.char_index + 1, }
    }

    fn curr_line(&self) -> &[char] {
        &self.lines[self.line_index]
    }

    fn curr_line_len(&self) -> usize {
        self.lines[self.line_index].len()
    }

    fn curr_char(&self) -> char {
        self.lines[self.line_index][self.char_index]
    }

    fn peek_char(&self) -> Option<char> {
        self.curr_line().get(self.char_index + 1).copied()
    }

    /// Reconciles the current line's indentation against the indent stack.
    ///
    /// The measurement is taken once per line and stored; dedent emission
    /// re-enters here on each call without consuming input until the stack
    /// top matches the stored target.
    fn handle_indent_change(&mut self) -> Token {
        let position = self.position();
        let resuming = self.pending_indent.is_some();
        let new_indent = match self.pending_indent {
            Some(width) => width,
            None => {
                let width = measure_indent(self.curr_line());
                self.pending_indent = Some(width);
                width
            },
        };

        let current_indent = *self.indent_stack.last().unwrap_or(&0);

        if new_indent == current_indent {
            self.resolve_layout();
            // A continuation line at the same depth is already separated
            // by the previous line's trailing newline; the layout newline
            // is only owed at the start of the program and after a dedent
            // run.
            if resuming || self.line_index == 0 {
                return Token::new(TokenKind::Newline, "", position);
            }
            return self.next_token();
        }

        if new_indent > current_indent {
            self.indent_stack.push(new_indent);
            self.resolve_layout();
            return Token::new(TokenKind::Indent, "", position);
        }

        self.indent_stack.pop();
        Token::new(TokenKind::Dedent, "", position)
    }

    fn resolve_layout(&mut self) {
        self.indent_resolved = true;
        self.pending_indent = None;
        // Advance past the measured whitespace characters (not columns, so
        // tab-indented lines land on the first real character).
        self.char_index = self.curr_line()
                              .iter()
                              .take_while(|&&c| c == ' ' || c == '\t')
                              .count();
    }

    fn advance_line(&mut self) {
        self.line_index += 1;
        self.indent_resolved = false;
        self.pending_indent = None;
        self.char_index = 0;
        if self.line_index >= self.lines.len() {
            self.finished = true;
        }
    }

    fn skip_block_comment(&mut self) {
        self.char_index += 2;

        loop {
            if self.char_index >= self.curr_line_len() {
                self.advance_line();
                if self.finished {
                    return;
                }
                // A comment interior line carries no layout.
                self.indent_resolved = true;
                continue;
            }

            if self.curr_char() == '*' && self.peek_char() == Some('/') {
                self.char_index += 2;
                return;
            }

            self.char_index += 1;
        }
    }

    fn read_identifier(&mut self) -> Token {
        let position = self.position();
        let start = self.char_index;

        while self.char_index < self.curr_line_len()
              && (is_letter_or_digit(self.curr_char()) || self.curr_char() == '_')
        {
            self.char_index += 1;
        }

        let literal: String = self.curr_line()[start..self.char_index].iter().collect();
        Token::new(lookup_keyword(&literal), literal, position)
    }

    fn read_number(&mut self) -> Token {
        let position = self.position();
        let start = self.char_index;
        let mut is_float = false;

        while self.char_index < self.curr_line_len() {
            let ch = self.curr_char();
            if ch == '.' {
                // A second dot ends the number.
                if is_float {
                    break;
                }
                is_float = true;
            } else if !ch.is_ascii_digit() {
                break;
            }
            self.char_index += 1;
        }

        let literal: String = self.curr_line()[start..self.char_index].iter().collect();
        let kind = if is_float { TokenKind::Float } else { TokenKind::Int };
        Token::new(kind, literal, position)
    }

    /// Reads a string literal opened by `'` or `"`.
    ///
    /// A repeated opening quote makes the literal triple-quoted: it spans
    /// physical lines until the matching triple and is emitted as `DocStr`.
    /// An unterminated single-line string yields the content accumulated up
    /// to the end of the line.
    fn read_string(&mut self) -> Token {
        let position = self.position();
        let quote = self.curr_char();
        self.char_index += 1;

        if self.is_triple(quote) {
            self.char_index += 2;
            let literal = self.read_multiline_body(quote);
            return Token::new(TokenKind::DocStr, literal, position);
        }

        let literal = self.read_single_line_body(quote);
        Token::new(TokenKind::Str, literal, position)
    }

    fn read_fstring(&mut self) -> Token {
        let position = Position { file:   self.file_name.clone(),
                                  line:   self.line_index + 1,
                                  column: self.char_index, };

        let quote = self.curr_char();
        self.char_index += 1;

        let literal = if self.is_triple(quote) {
            self.char_index += 2;
            self.read_multiline_body(quote)
        } else {
            self.read_single_line_body(quote)
        };

        Token::new(TokenKind::FStr, literal, position)
    }

    fn is_triple(&self, quote: char) -> bool {
        self.char_index + 1 < self.curr_line_len()
        && self.curr_line()[self.char_index] == quote
        && self.curr_line()[self.char_index + 1] == quote
    }

    fn read_single_line_body(&mut self, quote: char) -> String {
        let mut out = String::new();

        while self.char_index < self.curr_line_len() {
            let ch = self.curr_char();
            if ch == quote {
                self.char_index += 1;
                break;
            }
            if ch == '\\' {
                self.char_index += 1;
                if self.char_index < self.curr_line_len() {
                    out.push(unescape(self.curr_char(), quote));
                }
            } else {
                out.push(ch);
            }
            self.char_index += 1;
        }

        out
    }

    fn read_multiline_body(&mut self, quote: char) -> String {
        let mut out = String::new();

        loop {
            if self.char_index >= self.curr_line_len() {
                out.push('\n');
                self.advance_line();
                if self.finished {
                    break;
                }
                // The literal owns this line; do not re-measure layout.
                self.indent_resolved = true;
                continue;
            }

            if self.char_index + 2 < self.curr_line_len()
               && self.curr_line()[self.char_index] == quote
               && self.curr_line()[self.char_index + 1] == quote
               && self.curr_line()[self.char_index + 2] == quote
            {
                self.char_index += 3;
                break;
            }

            let ch = self.curr_char();
            if ch == '\\' {
                self.char_index += 1;
                if self.char_index < self.curr_line_len() {
                    out.push(unescape(self.curr_char(), quote));
                }
            } else {
                out.push(ch);
            }
            self.char_index += 1;
        }

        out
    }
}

const fn unescape(escaped: char, quote: char) -> char {
    match escaped {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        c if c == quote => quote,
        c => c,
    }
}

fn is_letter(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_letter_or_digit(ch: char) -> bool {
    is_letter(ch) || ch.is_ascii_digit()
}

/// Measures the indentation width of a line: spaces count one column, tabs
/// count four, and any other character ends the measurement.
fn measure_indent(line: &[char]) -> usize {
    let mut count = 0;
    for &ch in line {
        match ch {
            ' ' => count += 1,
            '\t' => count += 4,
            _ => break,
        }
    }
    count
}
