use std::ops::Range;

use logos::Logos;

#[derive(Logos, Debug, Copy, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    #[token(",")]
    Comma,
    #[token("=")]
    Equals,
    /// `[Name]`
    #[regex(r"\[[^\]\n]*\]")]
    Class,
    #[regex(r"//[^\n]*", priority = 20)]
    Comment,
    #[regex("\"([^\"\\\\]|\\\\.)*\"")]
    Quoted,
    #[regex(r#"[^ \t\r\n\f,="\[\]]+"#, priority = 1)]
    Text,
}

/// A token of a single line. `token` is `None` where the line stopped being lexable.
#[derive(Debug, Clone, PartialEq)]
pub struct LineToken {
    pub token: Option<Token>,
    pub span: Range<usize>,
}

/// Splits a line into tokens. Stops at a comment or at the first character
/// that doesn't start any token, the latter is kept as an invalid token.
pub fn tokenize_line(line: &str, res: &mut Vec<LineToken>) {
    res.clear();
    let mut lexer = Token::lexer(line);
    while let Some(token) = lexer.next() {
        match token {
            Ok(Token::Comment) => break,
            Ok(token) => res.push(LineToken {
                token: Some(token),
                span: lexer.span(),
            }),
            Err(_) => {
                res.push(LineToken {
                    token: None,
                    span: lexer.span().start..line.len(),
                });
                break;
            }
        }
    }
}

/// Content of a quoted token without the quotes and with `\"` / `\\` resolved.
pub fn unquote(quoted: &str) -> String {
    let inner = quoted
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(quoted);
    let mut res = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                res.push(escaped);
            }
        } else {
            res.push(c);
        }
    }
    res
}

#[cfg(test)]
mod test {
    use logos::Logos;

    use super::{tokenize_line, unquote, LineToken, Token};

    #[test]
    fn track_lines() {
        let mut lex = Token::lexer("[Room]");
        assert_eq!(lex.next(), Some(Ok(Token::Class)));
        assert_eq!(lex.slice(), "[Room]");
        assert_eq!(lex.next(), None);

        let mut lex = Token::lexer("Wall 2000, -300 // outer wall");
        assert_eq!(lex.next(), Some(Ok(Token::Text)));
        assert_eq!(lex.slice(), "Wall");
        assert_eq!(lex.next(), Some(Ok(Token::Text)));
        assert_eq!(lex.slice(), "2000");
        assert_eq!(lex.next(), Some(Ok(Token::Comma)));
        assert_eq!(lex.next(), Some(Ok(Token::Text)));
        assert_eq!(lex.slice(), "-300");
        assert_eq!(lex.next(), Some(Ok(Token::Comment)));
        assert_eq!(lex.next(), None);

        let mut lex = Token::lexer("name=\"a \\\"b\\\"\"");
        assert_eq!(lex.next(), Some(Ok(Token::Text)));
        assert_eq!(lex.next(), Some(Ok(Token::Equals)));
        assert_eq!(lex.next(), Some(Ok(Token::Quoted)));
        assert_eq!(unquote(lex.slice()), "a \"b\"");
        assert_eq!(lex.next(), None);
    }

    #[test]
    fn text_stops_at_separators() {
        let mut lex = Token::lexer("a\x0cb=c[");
        assert_eq!(lex.next(), Some(Ok(Token::Text)));
        assert_eq!(lex.slice(), "a");
        assert_eq!(lex.next(), Some(Ok(Token::Text)));
        assert_eq!(lex.slice(), "b");
        assert_eq!(lex.next(), Some(Ok(Token::Equals)));
        assert_eq!(lex.next(), Some(Ok(Token::Text)));
        assert_eq!(lex.slice(), "c");
        assert!(matches!(lex.next(), Some(Err(_))));
    }

    #[test]
    fn broken_lines() {
        let mut tokens = Vec::new();
        tokenize_line("Name \"unterminated", &mut tokens);
        assert_eq!(
            tokens,
            vec![
                LineToken {
                    token: Some(Token::Text),
                    span: 0..4
                },
                LineToken {
                    token: None,
                    span: 5..18
                },
            ]
        );

        tokenize_line("   // only a comment", &mut tokens);
        assert!(tokens.is_empty());
    }
}
