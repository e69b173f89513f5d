//! Grammar document compiler.
//!
//! A grammar document is free-form documentation (usually Markdown) with the
//! productions placed in fenced blocks:
//!
//! ````text
//! Arithmetic over single digits.
//!
//! ```trellis
//! EXPRESSION = ADDITION | NUMBER
//! ADDITION = NUMBER '+' NUMBER
//! NUMBER = '^[0-9]'
//! ```
//! ````
//!
//! Every line inside a fence is one production. The first production becomes
//! the grammar root.

mod production;

pub use production::Production;

use crate::error::GrammarError;
use crate::lexer::tokenize;
use crate::rule::{Grammar, Rule};
use anyhow::{Context, Result};
use production::ProductionParser;
use rustc_hash::FxHashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_OPEN_FENCE: &str = "```trellis";
pub const DEFAULT_CLOSE_FENCE: &str = "```";

/// Fence markers that delimit grammar source inside a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Prefix of a line that opens a grammar block.
    pub open_fence: String,
    /// Prefix of a line that closes a grammar block.
    pub close_fence: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            open_fence: DEFAULT_OPEN_FENCE.to_string(),
            close_fence: DEFAULT_CLOSE_FENCE.to_string(),
        }
    }
}

/// Builds a [`Grammar`] one production at a time.
///
/// Use the free function [`compile_grammar()`] for whole documents; the
/// compiler itself is handy when productions come from somewhere else.
#[derive(Debug, Default)]
pub struct GrammarCompiler {
    root: Option<(String, Arc<Rule>)>,
    productions: FxHashMap<String, Arc<Rule>>,
}

impl GrammarCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles one production line. `line_number` is only used for errors.
    pub fn add_line(&mut self, line: &str, line_number: usize) -> Result<(), GrammarError> {
        let tokens = tokenize(line);
        if tokens.is_empty() {
            return Ok(());
        }

        let parser = ProductionParser::new(tokens, line_number, line.chars().count());
        let production = parser.parse_production()?;
        self.register(production)
    }

    /// Registers an already parsed production.
    pub fn register(&mut self, production: Production) -> Result<(), GrammarError> {
        let Production {
            name,
            rule,
            location,
        } = production;

        if self.productions.contains_key(&name) {
            return Err(GrammarError::DuplicateProduction { name, location });
        }

        debug!(
            production = %name,
            kind = rule.kind(),
            children = rule.children().len(),
            line = location.line,
            "registered production"
        );

        let rule = Arc::new(rule);
        if self.root.is_none() {
            self.root = Some((name.clone(), Arc::clone(&rule)));
        }
        self.productions.insert(name, rule);
        Ok(())
    }

    pub fn finish(self) -> Grammar {
        match self.root {
            Some((name, root)) => Grammar::new(root, Some(name), self.productions),
            None => Grammar::empty(),
        }
    }
}

/// Compiles a grammar document using the default fence markers.
pub fn compile_grammar(document: &str) -> Result<Grammar, GrammarError> {
    compile_grammar_with(document, &CompileOptions::default())
}

/// Compiles a grammar document. Any error aborts the whole compilation.
pub fn compile_grammar_with(
    document: &str,
    options: &CompileOptions,
) -> Result<Grammar, GrammarError> {
    let mut compiler = GrammarCompiler::new();
    let mut in_documentation = true;

    for (index, line) in document.lines().enumerate() {
        if in_documentation {
            if line.starts_with(&options.open_fence) {
                in_documentation = false;
            }
        } else if line.starts_with(&options.close_fence) {
            in_documentation = true;
        } else {
            compiler.add_line(line, index + 1)?;
        }
    }

    let grammar = compiler.finish();
    debug!(
        productions = grammar.len(),
        root = grammar.root_name().unwrap_or("<empty>"),
        "compiled grammar"
    );
    Ok(grammar)
}

/// Reads and compiles a grammar document from disk.
///
/// The returned error wraps a [`GrammarError`] when the document itself is
/// malformed; downcast to recover its location.
pub fn load_grammar(path: impl AsRef<Path>, options: &CompileOptions) -> Result<Grammar> {
    let path = path.as_ref();
    let document = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read grammar from {}", path.display()))?;
    let grammar = compile_grammar_with(&document, options)?;
    Ok(grammar)
}
