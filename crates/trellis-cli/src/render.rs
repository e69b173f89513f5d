//! Output formats for `trellis parse`.

use colored::*;
use serde::Serialize;
use std::fmt::Write;
use trellis_eval::{SyntaxNode, SyntaxTree};

/// JSON shape of one node. Leaves carry their text, inner nodes their children.
#[derive(Debug, Serialize)]
pub struct NodeView<'a> {
    pub label: &'a str,
    pub start: usize,
    pub end: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeView<'a>>,
}

impl<'a> From<&'a SyntaxNode> for NodeView<'a> {
    fn from(node: &'a SyntaxNode) -> Self {
        Self {
            label: node.label(),
            start: node.span().start(),
            end: node.span().end(),
            text: node.is_leaf().then(|| node.text()),
            children: node.children().iter().map(NodeView::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ParseReport<'a> {
    pub input: String,
    pub tree: NodeView<'a>,
}

impl<'a> ParseReport<'a> {
    pub fn new(input: impl Into<String>, tree: &'a SyntaxTree) -> Self {
        Self {
            input: input.into(),
            tree: NodeView::from(tree.root()),
        }
    }
}

/// Indented outline with colored labels; plain when colors are disabled.
pub fn render_tree(tree: &SyntaxTree) -> String {
    let mut out = String::new();
    write_node(&mut out, tree.root(), 0);
    out
}

fn write_node(out: &mut String, node: &SyntaxNode, depth: usize) {
    let range = format!("[{}..{}]", node.span().start(), node.span().end());
    let _ = write!(
        out,
        "{:indent$}{} {}",
        "",
        node.label().cyan().bold(),
        range.dimmed(),
        indent = depth * 2
    );
    if node.is_leaf() {
        let _ = write!(out, " {}", format!("{:?}", node.text()).green());
    }
    out.push('\n');
    for child in node.children() {
        write_node(out, child, depth + 1);
    }
}
