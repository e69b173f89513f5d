//! Backtracking tree-walking matcher.
//!
//! Submodules:
//! - [`terminals`] – literal and regex terminals, whitespace skipping
//!
//! Every rule execution receives the cursor by value and, on success, hands
//! back the node it built together with the new cursor position. A rule that
//! fails returns `Ok(None)` and leaves nothing behind, so the caller's cursor
//! is untouched. `Err` is reserved for errors that abort the whole parse.

mod terminals;

use anyhow::Result;
use tracing::{debug, trace};

use crate::bail_at;
use crate::error::EvalErrorKind;
use crate::tree::{SyntaxNode, SyntaxTree};
use trellis_syntax::rule::{Grammar, MatchMode, ReferenceRule, Rule};
use trellis_syntax::text::{Snapshot, Span};

/// Label given to the node produced by the grammar root.
pub const ROOT_LABEL: &str = "ROOT";

/// Label and whitespace policy applied to nodes built at one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context<'a> {
    pub label: &'a str,
    pub mode: MatchMode,
}

impl<'a> Context<'a> {
    pub fn new(label: &'a str, mode: MatchMode) -> Self {
        Self { label, mode }
    }

    pub fn root() -> Context<'static> {
        Context {
            label: ROOT_LABEL,
            mode: MatchMode::Skipping,
        }
    }
}

/// A successful match: the node built and the cursor just past it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matched {
    pub node: SyntaxNode,
    pub end: usize,
}

/// `None` is an ordinary non-match.
pub type Outcome = Option<Matched>;

/// Runs one grammar against one snapshot.
///
/// Holds no mutable state, so a single grammar can drive any number of
/// executors concurrently.
pub struct Executor<'a> {
    grammar: &'a Grammar,
    snapshot: &'a Snapshot,
}

impl<'a> Executor<'a> {
    pub fn new(grammar: &'a Grammar, snapshot: &'a Snapshot) -> Self {
        Self { grammar, snapshot }
    }

    /// Matches the grammar root at offset 0.
    ///
    /// When the root does not match, the tree consists of a single `ROOT` node
    /// over the whole snapshot.
    pub fn run(&self) -> Result<SyntaxTree> {
        let root = match self.execute_rule(self.grammar.root(), Context::root(), 0)? {
            Some(matched) => matched.node,
            None => SyntaxNode::leaf(ROOT_LABEL, self.snapshot.extent()),
        };
        Ok(SyntaxTree::new(root))
    }

    /// Matches the production `name` starting at `cursor`, labeling the result
    /// with `name` exactly as a reference to it would.
    pub fn execute_production(&self, name: &str, cursor: usize) -> Result<Outcome> {
        self.execute_reference(&ReferenceRule::new(name), cursor)
    }

    /// Dispatches on the rule variant.
    pub fn execute_rule(&self, rule: &Rule, ctx: Context<'_>, cursor: usize) -> Result<Outcome> {
        match rule {
            Rule::Match(m) => self.execute_match(m, ctx, cursor),
            Rule::And(children) => self.execute_and(children, ctx, cursor),
            Rule::Or(children) => self.execute_or(children, ctx, cursor),
            Rule::Reference(r) => self.execute_reference(r, cursor),
        }
    }

    /// Every child must match in order; each one starts where the previous
    /// one stopped and inherits the same context.
    fn execute_and(&self, children: &[Rule], ctx: Context<'_>, cursor: usize) -> Result<Outcome> {
        let mut nodes = Vec::with_capacity(children.len());
        let mut position = cursor;

        for child in children {
            let Some(matched) = self.execute_rule(child, ctx, position)? else {
                return Ok(None);
            };
            position = matched.end;
            nodes.push(matched.node);
        }

        // Skipped whitespace before the first child is not part of the span.
        let start = nodes.first().map_or(cursor, |node| node.span().start());
        let span = Span::from_range(self.snapshot.clone(), start, position);

        Ok(Some(Matched {
            node: SyntaxNode::new(ctx.label, span, nodes),
            end: position,
        }))
    }

    /// Ordered choice: every alternative starts at `cursor` and the first
    /// success is returned as is, without a wrapping node.
    fn execute_or(&self, children: &[Rule], ctx: Context<'_>, cursor: usize) -> Result<Outcome> {
        for child in children {
            if let Some(matched) = self.execute_rule(child, ctx, cursor)? {
                return Ok(Some(matched));
            }
        }
        Ok(None)
    }

    /// Resolves by name at traversal time and labels the result with the
    /// reference's own name.
    fn execute_reference(&self, reference: &ReferenceRule, cursor: usize) -> Result<Outcome> {
        let Some(rule) = self.grammar.production(reference.name()) else {
            bail_at!(
                cursor,
                EvalErrorKind::UnresolvedReference {
                    name: reference.name().to_string()
                }
            );
        };

        trace!(production = reference.name(), cursor, "entering production");
        self.execute_rule(rule, Context::new(reference.name(), reference.mode()), cursor)
    }
}

/// Matches `grammar` against `snapshot` and returns the resulting tree.
///
/// A grammar that does not match still yields a tree (a bare `ROOT` node).
/// Errors are reserved for references to undefined productions and invalid
/// regex terminals actually reached during matching; they carry an
/// [`EvalError`](crate::error::EvalError).
pub fn parse(grammar: &Grammar, snapshot: &Snapshot) -> Result<SyntaxTree> {
    debug!(
        productions = grammar.len(),
        input_len = snapshot.len(),
        version = snapshot.version(),
        "parsing snapshot"
    );

    let tree = Executor::new(grammar, snapshot).run()?;

    debug!(
        root = tree.root().label(),
        matched = tree.root().span().len(),
        "parse finished"
    );
    Ok(tree)
}
