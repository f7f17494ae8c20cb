use crate::{ast::FStringPart,
            error::ParseError,
            interpreter::{lexer::{Lexer, Position},
                          parser::core::{ParseResult, Parser}}};

/// Splits an f-string body into literal text and embedded expressions.
///
/// Braces delimit embedded expressions; `{{` and `}}` escape literal
/// braces. Each embedded fragment is lexed and parsed recursively as a
/// single expression.
///
/// # Errors
/// Returns a [`ParseError`] when braces are unbalanced or an embedded
/// fragment fails to parse.
pub fn split_fstring(body: &str, position: &Position) -> ParseResult<Vec<FStringPart>> {
    let mut parts = Vec::new();
    let mut text = String::new();
    let mut chars = body.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    text.push('{');
                    continue;
                }

                if !text.is_empty() {
                    parts.push(FStringPart::Text(std::mem::take(&mut text)));
                }

                let mut fragment = String::new();
                let mut depth = 1usize;
                for inner in chars.by_ref() {
                    match inner {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        },
                        _ => {},
                    }
                    fragment.push(inner);
                }
                if depth != 0 {
                    return Err(ParseError::UnbalancedFString { position: position.clone(), });
                }

                let lexer = Lexer::new(&fragment, &position.file);
                let expr = Parser::new(lexer).parse_fragment()?;
                parts.push(FStringPart::Expr(expr));
            },
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                    text.push('}');
                } else {
                    return Err(ParseError::UnbalancedFString { position: position.clone(), });
                }
            },
            _ => text.push(ch),
        }
    }

    if !text.is_empty() {
        parts.push(FStringPart::Text(text));
    }

    Ok(parts)
}
