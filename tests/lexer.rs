use corvid::interpreter::lexer::{Lexer, TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    let mut lexer = Lexer::new(source, "");
    let mut kinds = Vec::new();
    loop {
        let token = lexer.next_token();
        let is_eof = token.kind == TokenKind::Eof;
        kinds.push(token.kind);
        if is_eof {
            break;
        }
    }
    kinds
}

fn literals(source: &str) -> Vec<(TokenKind, String)> {
    let mut lexer = Lexer::new(source, "");
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let is_eof = token.kind == TokenKind::Eof;
        tokens.push((token.kind, token.literal));
        if is_eof {
            break;
        }
    }
    tokens
}

#[test]
fn indentation_produces_layout_tokens() {
    use TokenKind::{Assign, Colon, Dedent, Eof, Ident, If, Indent, Int, Newline};

    assert_eq!(kinds("if x:\n  y = 1\n  z = 2\nw = 3\n"),
               vec![Newline, If, Ident, Colon, Newline, Indent, Ident, Assign, Int, Newline,
                    Ident, Assign, Int, Newline, Dedent, Newline, Ident, Assign, Int, Newline,
                    Newline, Eof]);
}

#[test]
fn multi_level_dedents_emit_one_per_call() {
    let stream = kinds("if x:\n    if y:\n        a = 1\nb = 2\n");

    let dedent_run: Vec<TokenKind> =
        stream.iter()
              .copied()
              .skip_while(|&k| k != TokenKind::Dedent)
              .take_while(|&k| k == TokenKind::Dedent)
              .collect();
    assert_eq!(dedent_run.len(), 2, "both levels must dedent, one token per call");
}

#[test]
fn pending_dedents_flush_before_eof() {
    let stream = kinds("if x:\n    y = 1");
    let tail: Vec<TokenKind> = stream[stream.len() - 3..].to_vec();
    assert_eq!(tail, vec![TokenKind::Newline, TokenKind::Dedent, TokenKind::Eof]);
}

#[test]
fn tab_indentation_counts_four_columns() {
    use TokenKind::{Assign, Colon, Dedent, Eof, Ident, If, Indent, Int, Newline};

    assert_eq!(kinds("if x:\n\ty = 1\n"),
               vec![Newline, If, Ident, Colon, Newline, Indent, Ident, Assign, Int, Newline,
                    Dedent, Newline, Newline, Eof]);
}

#[test]
fn operators_use_longest_match() {
    use TokenKind::{Decrement, Eq, Ge, Increment, Le, Lshift, MinusAssign, NotEq, Plus,
                    PlusAssign, Power, Rshift, SlashAssign, StarAssign};

    let stream = kinds("** ++ -- += -= *= /= == != <= >= << >> +");
    let operators: Vec<TokenKind> = stream.into_iter()
                                          .filter(|k| {
                                              !matches!(k,
                                                        TokenKind::Newline | TokenKind::Eof)
                                          })
                                          .collect();
    assert_eq!(operators,
               vec![Power, Increment, Decrement, PlusAssign, MinusAssign, StarAssign,
                    SlashAssign, Eq, NotEq, Le, Ge, Lshift, Rshift, Plus]);
}

#[test]
fn keywords_are_looked_up() {
    use TokenKind::{Attempt, Case, Check, Ensnare, Grim, Match, Otherwise, Raise, Resolve, Skip,
                    Spell, Stop};

    let stream = kinds("spell grim attempt ensnare resolve raise check stop skip match case otherwise");
    let keywords: Vec<TokenKind> = stream.into_iter()
                                         .filter(|k| {
                                             !matches!(k, TokenKind::Newline | TokenKind::Eof)
                                         })
                                         .collect();
    assert_eq!(keywords,
               vec![Spell, Grim, Attempt, Ensnare, Resolve, Raise, Check, Stop, Skip, Match,
                    Case, Otherwise]);
}

#[test]
fn string_escapes_decode() {
    let tokens = literals("s = 'a\\nb\\t\\\\c'");
    let (kind, literal) = tokens.iter()
                                .find(|(k, _)| *k == TokenKind::Str)
                                .expect("string token");
    assert_eq!(*kind, TokenKind::Str);
    assert_eq!(literal, "a\nb\t\\c");
}

#[test]
fn unknown_escapes_pass_through() {
    let tokens = literals("s = 'a\\qb'");
    let (_, literal) = tokens.iter()
                             .find(|(k, _)| *k == TokenKind::Str)
                             .expect("string token");
    assert_eq!(literal, "aqb");
}

#[test]
fn unterminated_strings_keep_their_content() {
    let tokens = literals("s = \"abc");
    let (_, literal) = tokens.iter()
                             .find(|(k, _)| *k == TokenKind::Str)
                             .expect("string token");
    assert_eq!(literal, "abc");
}

#[test]
fn triple_quotes_make_docstrings() {
    let tokens = literals("d = \"\"\"line one\nline two\"\"\"");
    let (_, literal) = tokens.iter()
                             .find(|(k, _)| *k == TokenKind::DocStr)
                             .expect("docstring token");
    assert_eq!(literal, "line one\nline two");
}

#[test]
fn fstrings_have_their_own_kind() {
    let tokens = literals("m = f\"x is {x}\"");
    let (_, literal) = tokens.iter()
                             .find(|(k, _)| *k == TokenKind::FStr)
                             .expect("f-string token");
    assert_eq!(literal, "x is {x}");
}

#[test]
fn numbers_split_on_second_dot() {
    let tokens = literals("1.5 2 3.");
    let numeric: Vec<(TokenKind, String)> =
        tokens.into_iter()
              .filter(|(k, _)| matches!(k, TokenKind::Int | TokenKind::Float))
              .collect();
    assert_eq!(numeric,
               vec![(TokenKind::Float, "1.5".to_string()),
                    (TokenKind::Int, "2".to_string()),
                    (TokenKind::Float, "3.".to_string())]);
}

#[test]
fn lone_underscore_is_a_punctuator() {
    let stream = kinds("_ _name name_");
    let interesting: Vec<TokenKind> = stream.into_iter()
                                            .filter(|k| {
                                                !matches!(k,
                                                          TokenKind::Newline | TokenKind::Eof)
                                            })
                                            .collect();
    assert_eq!(interesting,
               vec![TokenKind::Underscore, TokenKind::Ident, TokenKind::Ident]);
}

#[test]
fn illegal_characters_do_not_stop_the_lexer() {
    let tokens = literals("a $ b");
    let illegal = tokens.iter().find(|(k, _)| *k == TokenKind::Illegal);
    assert!(illegal.is_some(), "expected an Illegal token for '$'");
    let idents = tokens.iter().filter(|(k, _)| *k == TokenKind::Ident).count();
    assert_eq!(idents, 2, "lexing continues past the illegal character");
}

#[test]
fn comments_produce_no_tokens() {
    use TokenKind::{Assign, Eof, Ident, Int, Newline};

    assert_eq!(kinds("x = 1 // trailing\n"),
               vec![Newline, Ident, Assign, Int, Newline, Newline, Eof]);
    assert_eq!(kinds("y = 2 /* inline */ + 3"),
               vec![Newline, Ident, Assign, Int, TokenKind::Plus, Int, Newline, Eof]);
}

#[test]
fn positions_are_one_based() {
    let mut lexer = Lexer::new("x = 1\n  y", "main.crl");

    let newline = lexer.next_token();
    assert_eq!(newline.position.line, 1);

    let x = lexer.next_token();
    assert_eq!(x.position.file, "main.crl");
    assert_eq!((x.position.line, x.position.column), (1, 1));

    let assign = lexer.next_token();
    assert_eq!((assign.position.line, assign.position.column), (1, 3));

    let one = lexer.next_token();
    assert_eq!((one.position.line, one.position.column), (1, 5));
}

#[test]
fn eof_repeats_forever() {
    let mut lexer = Lexer::new("x", "");
    loop {
        if lexer.next_token().kind == TokenKind::Eof {
            break;
        }
    }
    for _ in 0..3 {
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }
}
