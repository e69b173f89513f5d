//! The compiled rule graph.
//!
//! Rules never point at each other directly across productions; a
//! [`Rule::Reference`] names its target and is resolved against
//! [`Grammar::production`] while matching. That keeps recursive and mutually
//! recursive grammars free of construction-order constraints.

use once_cell::sync::OnceCell;
use regex_automata::meta::{BuildError, Regex};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// Prefix that turns a match pattern into a regular expression.
pub const REGEX_PREFIX: char = '^';

/// Whether leading whitespace is skipped before a terminal is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Skip whitespace, then match.
    #[default]
    Skipping,
    /// Whitespace is significant.
    Lexical,
}

impl MatchMode {
    /// Mode implied by a production name: a leading `_` marks it lexical.
    pub fn for_name(name: &str) -> Self {
        if name.starts_with('_') {
            MatchMode::Lexical
        } else {
            MatchMode::Skipping
        }
    }

    pub fn skips_whitespace(self) -> bool {
        self == MatchMode::Skipping
    }
}

/// Terminal rule: an exact literal or, with a leading `^`, a regex.
pub struct MatchRule {
    pattern: String,
    regex: OnceCell<Regex>,
}

impl MatchRule {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            regex: OnceCell::new(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_regex(&self) -> bool {
        self.pattern.starts_with(REGEX_PREFIX)
    }

    /// The compiled expression body (the pattern without its `^`). Compiled
    /// on first call; concurrent first calls still compile only once.
    ///
    /// The body carries no anchor of its own. Callers run it as an anchored
    /// search over the whole text so look-around assertions such as `\b`
    /// see the characters before the match position.
    ///
    /// Returns `None` for literal patterns.
    pub fn regex(&self) -> Option<Result<&Regex, BuildError>> {
        let body = self.pattern.strip_prefix(REGEX_PREFIX)?;
        Some(self.regex.get_or_try_init(|| Regex::new(body)))
    }
}

impl fmt::Debug for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchRule")
            .field("pattern", &self.pattern)
            .field("compiled", &self.regex.get().is_some())
            .finish()
    }
}

/// Indirection to a named production.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRule {
    name: String,
    mode: MatchMode,
}

impl ReferenceRule {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let mode = MatchMode::for_name(&name);
        Self { name, mode }
    }

    pub fn with_mode(name: impl Into<String>, mode: MatchMode) -> Self {
        Self {
            name: name.into(),
            mode,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mode the referenced production is matched in.
    pub fn mode(&self) -> MatchMode {
        self.mode
    }
}

#[derive(Debug)]
pub enum Rule {
    Match(MatchRule),
    And(Vec<Rule>),
    Or(Vec<Rule>),
    Reference(ReferenceRule),
}

impl Rule {
    pub fn literal(pattern: impl Into<String>) -> Self {
        Rule::Match(MatchRule::new(pattern))
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Rule::Reference(ReferenceRule::new(name))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Rule::Match(m) if m.is_regex() => "regex",
            Rule::Match(_) => "match",
            Rule::And(_) => "and",
            Rule::Or(_) => "or",
            Rule::Reference(_) => "reference",
        }
    }

    /// Child rules of an `And`/`Or`; empty for terminals and references.
    pub fn children(&self) -> &[Rule] {
        match self {
            Rule::And(children) | Rule::Or(children) => children,
            Rule::Match(_) | Rule::Reference(_) => &[],
        }
    }
}

/// Renders a rule back into production syntax.
impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Match(m) => write!(f, "'{}'", m.pattern()),
            Rule::Reference(r) => write!(f, "{}", r.name()),
            Rule::And(children) | Rule::Or(children) => {
                let separator = if matches!(self, Rule::Or(_)) { " | " } else { " " };
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(separator)?;
                    }
                    write!(f, "{}", child)?;
                }
                Ok(())
            }
        }
    }
}

/// A compiled grammar: a root rule plus every named production.
///
/// Immutable once built and safe to share across threads; the only interior
/// mutability is each regex terminal's compile-once cache.
#[derive(Debug)]
pub struct Grammar {
    root: Arc<Rule>,
    root_name: Option<String>,
    productions: FxHashMap<String, Arc<Rule>>,
}

impl Grammar {
    pub(crate) fn new(
        root: Arc<Rule>,
        root_name: Option<String>,
        productions: FxHashMap<String, Arc<Rule>>,
    ) -> Self {
        Self {
            root,
            root_name,
            productions,
        }
    }

    /// A grammar with no productions; its root is an empty `And`.
    pub fn empty() -> Self {
        Self::new(Arc::new(Rule::And(Vec::new())), None, FxHashMap::default())
    }

    pub fn root(&self) -> &Rule {
        &self.root
    }

    /// Name of the production that became the root, if any.
    pub fn root_name(&self) -> Option<&str> {
        self.root_name.as_deref()
    }

    pub fn production(&self, name: &str) -> Option<&Rule> {
        self.productions.get(name).map(Arc::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.productions.contains_key(name)
    }

    /// All productions, in no particular order.
    pub fn productions(&self) -> impl Iterator<Item = (&str, &Rule)> {
        self.productions
            .iter()
            .map(|(name, rule)| (name.as_str(), rule.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.productions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.productions.is_empty()
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn grammar_is_shareable() {
        assert_send_sync::<Grammar>();
    }

    #[test]
    fn mode_follows_leading_underscore() {
        assert_eq!(MatchMode::for_name("_DIGITS"), MatchMode::Lexical);
        assert_eq!(MatchMode::for_name("NUMBER"), MatchMode::Skipping);
        assert_eq!(ReferenceRule::new("_X").mode(), MatchMode::Lexical);
    }

    #[test]
    fn literal_has_no_regex() {
        let rule = MatchRule::new("if");
        assert!(!rule.is_regex());
        assert!(rule.regex().is_none());
    }

    #[test]
    fn regex_is_cached() {
        let rule = MatchRule::new("^[0-9]+|x");
        let first = rule.regex().unwrap().unwrap() as *const Regex;
        let second = rule.regex().unwrap().unwrap() as *const Regex;
        assert_eq!(first, second);
    }

    #[test]
    fn regex_body_matches_when_anchored() {
        use regex_automata::{Anchored, Input};

        let rule = MatchRule::new("^[0-9]+|x");
        let regex = rule.regex().unwrap().unwrap();
        let anchored = |text: &str| regex.search(&Input::new(text).anchored(Anchored::Yes));

        assert!(anchored("a1").is_none());
        assert_eq!(anchored("12a").map(|m| m.range()), Some(0..2));
        assert!(anchored("ax").is_none());
    }

    #[test]
    fn invalid_regex_reports_error() {
        let rule = MatchRule::new("^[unclosed");
        assert!(rule.regex().unwrap().is_err());
    }

    #[test]
    fn display_round_trips_production_body() {
        let rule = Rule::Or(vec![Rule::literal("and"), Rule::reference("OR_WORD")]);
        assert_eq!(rule.to_string(), "'and' | OR_WORD");
        let rule = Rule::And(vec![Rule::reference("A"), Rule::literal("+")]);
        assert_eq!(rule.to_string(), "A '+'");
    }
}
