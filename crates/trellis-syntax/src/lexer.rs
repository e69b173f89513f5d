//! Line lexer for grammar productions.
//!
//! Lexing never fails: stray characters end up inside identifier tokens and an
//! unterminated quote swallows the rest of the line. Whether the result makes
//! a valid production is decided by the compiler.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `=`
    Equals,
    /// `|`
    Pipe,
    /// `'`, emitted on both sides of a literal.
    Quote,
    /// Text between two quotes, verbatim (no escapes).
    Literal(String),
    /// Any other run of non-separator characters.
    Identifier(String),
}

impl Token {
    pub fn display_name(&self) -> String {
        match self {
            Token::Equals => "'='".to_string(),
            Token::Pipe => "'|'".to_string(),
            Token::Quote => "quote".to_string(),
            Token::Literal(s) => format!("literal '{}'", s),
            Token::Identifier(s) => format!("identifier '{}'", s),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Equals => write!(f, "="),
            Token::Pipe => write!(f, "|"),
            Token::Quote => write!(f, "'"),
            Token::Literal(s) | Token::Identifier(s) => write!(f, "{}", s),
        }
    }
}

/// A token plus the zero-based character column it starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedToken {
    pub token: Token,
    pub column: usize,
}

#[inline]
fn is_separator(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n' | '=' | '|' | '\'')
}

/// Returns `true` if `text` is a well-formed production or reference name.
pub fn is_identifier(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|ch| ch.is_alphanumeric() || ch == '_')
}

/// Splits one grammar line into tokens.
pub fn tokenize(line: &str) -> Vec<SpannedToken> {
    let mut tokens = Vec::with_capacity(line.len() / 2);
    let mut chars = line.chars().peekable();
    let mut column = 0;

    while let Some(&ch) = chars.peek() {
        let start = column;

        match ch {
            ' ' | '\t' | '\r' | '\n' => {
                chars.next();
                column += 1;
            }

            '=' => {
                chars.next();
                column += 1;
                tokens.push(SpannedToken {
                    token: Token::Equals,
                    column: start,
                });
            }

            '|' => {
                chars.next();
                column += 1;
                tokens.push(SpannedToken {
                    token: Token::Pipe,
                    column: start,
                });
            }

            '\'' => {
                chars.next();
                column += 1;
                tokens.push(SpannedToken {
                    token: Token::Quote,
                    column: start,
                });

                let literal_start = column;
                let mut literal = String::new();
                let mut closed = false;

                for ch in chars.by_ref() {
                    column += 1;
                    if ch == '\'' {
                        closed = true;
                        break;
                    }
                    literal.push(ch);
                }

                tokens.push(SpannedToken {
                    token: Token::Literal(literal),
                    column: literal_start,
                });

                if closed {
                    tokens.push(SpannedToken {
                        token: Token::Quote,
                        column: column - 1,
                    });
                }
            }

            _ => {
                let mut name = String::new();
                while let Some(&ch) = chars.peek() {
                    if is_separator(ch) {
                        break;
                    }
                    name.push(ch);
                    chars.next();
                    column += 1;
                }

                tokens.push(SpannedToken {
                    token: Token::Identifier(name),
                    column: start,
                });
            }
        }
    }

    tokens
}
