//! Parsing of a single `NAME = term ...` production line.

use crate::error::{GrammarError, Location};
use crate::lexer::{SpannedToken, Token, is_identifier};
use crate::rule::Rule;

/// A parsed production line, not yet registered.
#[derive(Debug)]
pub struct Production {
    pub name: String,
    pub rule: Rule,
    pub location: Location,
}

/// Cursor over the tokens of one line.
pub(super) struct ProductionParser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    line: usize,
    end_column: usize,
}

impl ProductionParser {
    pub(super) fn new(tokens: Vec<SpannedToken>, line: usize, end_column: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            line,
            end_column,
        }
    }

    #[inline]
    fn peek(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.pos)
    }

    #[inline]
    fn advance(&mut self) -> Option<SpannedToken> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn location(&self, column: usize) -> Location {
        Location::new(self.line, column)
    }

    pub(super) fn parse_production(mut self) -> Result<Production, GrammarError> {
        let (name, name_column) = match self.advance() {
            Some(SpannedToken {
                token: Token::Identifier(name),
                column,
            }) if is_identifier(&name) => (name, column),
            Some(st) => {
                return Err(GrammarError::MissingProductionName {
                    found: st.token.to_string(),
                    location: self.location(st.column),
                });
            }
            None => {
                return Err(GrammarError::MissingProductionName {
                    found: String::new(),
                    location: self.location(0),
                });
            }
        };

        match self.advance() {
            Some(SpannedToken {
                token: Token::Equals,
                ..
            }) => {}
            Some(st) => {
                return Err(GrammarError::ExpectedEquals {
                    found: Some(st.token.display_name()),
                    location: self.location(st.column),
                });
            }
            None => {
                return Err(GrammarError::ExpectedEquals {
                    found: None,
                    location: self.location(self.end_column),
                });
            }
        }

        let rule = self.parse_terms()?;

        Ok(Production {
            name,
            rule,
            location: self.location(name_column),
        })
    }

    /// Any `|` among the terms makes the whole production an `Or`.
    fn parse_terms(&mut self) -> Result<Rule, GrammarError> {
        let mut children = Vec::new();
        let mut is_or = false;

        while let Some(st) = self.advance() {
            match st.token {
                Token::Quote => children.push(self.parse_literal(st.column)?),
                Token::Pipe => is_or = true,
                Token::Identifier(name) => {
                    if !is_identifier(&name) {
                        return Err(GrammarError::InvalidReference {
                            name,
                            location: self.location(st.column),
                        });
                    }
                    children.push(Rule::reference(name));
                }
                other => {
                    return Err(GrammarError::UnexpectedToken {
                        found: other.display_name(),
                        location: self.location(st.column),
                    });
                }
            }
        }

        Ok(if is_or {
            Rule::Or(children)
        } else {
            Rule::And(children)
        })
    }

    /// Called after the opening quote has been consumed.
    fn parse_literal(&mut self, quote_column: usize) -> Result<Rule, GrammarError> {
        let text = match self.advance() {
            Some(SpannedToken {
                token: Token::Literal(text),
                ..
            }) => text,
            _ => {
                return Err(GrammarError::UnterminatedString {
                    location: self.location(quote_column),
                });
            }
        };

        match self.peek() {
            Some(SpannedToken {
                token: Token::Quote,
                ..
            }) => {
                self.advance();
                Ok(Rule::literal(text))
            }
            _ => Err(GrammarError::UnterminatedString {
                location: self.location(quote_column),
            }),
        }
    }
}
