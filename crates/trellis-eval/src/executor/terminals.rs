//! Terminal matching: exact literals and `^`-prefixed regexes.

use anyhow::Result;
use regex_automata::meta::Regex;
use regex_automata::{Anchored, Input};

use crate::bail_at;
use crate::error::EvalErrorKind;
use crate::tree::SyntaxNode;
use trellis_syntax::rule::{MatchMode, MatchRule};
use trellis_syntax::text::Span;

use super::{Context, Executor, Matched, Outcome};

impl Executor<'_> {
    pub(super) fn execute_match(
        &self,
        rule: &MatchRule,
        ctx: Context<'_>,
        cursor: usize,
    ) -> Result<Outcome> {
        let start = self.skip_whitespace(cursor, ctx.mode);

        let end = match rule.regex() {
            None => self.match_literal(rule.pattern(), start),
            Some(Ok(regex)) => self.match_regex(regex, start),
            Some(Err(err)) => bail_at!(
                start,
                EvalErrorKind::InvalidPattern {
                    pattern: rule.pattern().to_string(),
                    reason: err.to_string(),
                }
            ),
        };

        Ok(end.map(|end| Matched {
            node: SyntaxNode::leaf(
                ctx.label,
                Span::from_range(self.snapshot.clone(), start, end),
            ),
            end,
        }))
    }

    /// First offset at or after `cursor` the terminal should be compared at.
    fn skip_whitespace(&self, cursor: usize, mode: MatchMode) -> usize {
        let mut position = cursor;
        if mode.skips_whitespace() {
            while self
                .snapshot
                .get(position)
                .is_some_and(char::is_whitespace)
            {
                position += 1;
            }
        }
        position
    }

    /// Character-by-character comparison; running out of input is a mismatch.
    fn match_literal(&self, literal: &str, start: usize) -> Option<usize> {
        let mut position = start;
        for expected in literal.chars() {
            if self.snapshot.get(position) != Some(expected) {
                return None;
            }
            position += 1;
        }
        Some(position)
    }

    /// Anchored search at `start` over the cached whole text. Text before
    /// `start` stays visible to look-around assertions.
    fn match_regex(&self, regex: &Regex, start: usize) -> Option<usize> {
        let text = self.snapshot.whole_text();
        let from = self.snapshot.byte_offset(start);
        let input = Input::new(text).range(from..).anchored(Anchored::Yes);
        let found = regex.search(&input)?;
        Some(start + text[found.range()].chars().count())
    }
}
