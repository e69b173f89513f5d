//! The labeled syntax tree produced by a match.

use std::fmt;
use trellis_syntax::text::{Snapshot, Span};

/// One labeled node: a span plus its ordered children (empty for terminals).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    label: String,
    span: Span,
    children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn leaf(label: impl Into<String>, span: Span) -> Self {
        Self::new(label, span, Vec::new())
    }

    pub fn new(label: impl Into<String>, span: Span, children: Vec<SyntaxNode>) -> Self {
        Self {
            label: label.into(),
            span,
            children,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn children(&self) -> &[SyntaxNode] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Text covered by this node, read from the snapshot.
    pub fn text(&self) -> String {
        self.span.text()
    }

    /// This node and everything below it, in pre-order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Leaf nodes, left to right.
    pub fn leaves(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.descendants().filter(|node| node.is_leaf())
    }

    /// All nodes (including `self`) whose label equals `label`, in pre-order.
    pub fn find_all<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a SyntaxNode> + 'a {
        self.descendants().filter(move |node| node.label == label)
    }

    fn write_outline(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(
            f,
            "{:indent$}{} [{}..{}]",
            "",
            self.label,
            self.span.start(),
            self.span.end(),
            indent = depth * 2
        )?;
        if self.is_leaf() {
            write!(f, " {:?}", self.text())?;
        }
        writeln!(f)?;
        for child in &self.children {
            child.write_outline(f, depth + 1)?;
        }
        Ok(())
    }
}

/// Indented outline, one node per line: `LABEL [start..end] "leaf text"`.
impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_outline(f, 0)
    }
}

/// Pre-order iterator returned by [`SyntaxNode::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a SyntaxNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Result of matching a grammar against a snapshot.
///
/// Holds a handle to the snapshot it was built from; no text is copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    root: SyntaxNode,
}

impl SyntaxTree {
    pub fn new(root: SyntaxNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.root.span().snapshot()
    }
}

impl fmt::Display for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SyntaxNode {
        let snapshot = Snapshot::new("3 + 5");
        SyntaxNode::new(
            "ADD",
            Span::new(snapshot.clone(), 0, 5),
            vec![
                SyntaxNode::leaf("NUMBER", Span::new(snapshot.clone(), 0, 1)),
                SyntaxNode::leaf("OP", Span::new(snapshot.clone(), 2, 1)),
                SyntaxNode::leaf("NUMBER", Span::new(snapshot, 4, 1)),
            ],
        )
    }

    #[test]
    fn descendants_are_pre_order() {
        let root = sample();
        let labels: Vec<_> = root.descendants().map(|n| n.label()).collect();
        assert_eq!(labels, vec!["ADD", "NUMBER", "OP", "NUMBER"]);
    }

    #[test]
    fn leaves_read_left_to_right() {
        let root = sample();
        let text: Vec<_> = root.leaves().map(|n| n.text()).collect();
        assert_eq!(text, vec!["3", "+", "5"]);
    }

    #[test]
    fn find_all_matches_labels() {
        let root = sample();
        assert_eq!(root.find_all("NUMBER").count(), 2);
        assert_eq!(root.find_all("MISSING").count(), 0);
    }

    #[test]
    fn outline_format() {
        let rendered = sample().to_string();
        assert_eq!(
            rendered,
            "ADD [0..5]\n  NUMBER [0..1] \"3\"\n  OP [2..3] \"+\"\n  NUMBER [4..5] \"5\"\n"
        );
    }

    #[test]
    fn tree_exposes_snapshot() {
        let tree = SyntaxTree::new(sample());
        assert_eq!(tree.snapshot().whole_text(), "3 + 5");
    }
}
