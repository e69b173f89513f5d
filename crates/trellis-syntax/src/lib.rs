//! # Trellis Syntax
//!
//! Text snapshots, the grammar lexer and the grammar compiler.
//!
//! ## Overview
//!
//! - **Text**: immutable, character-indexed [`Snapshot`]s and lazy [`Span`]s
//! - **Lexer**: splits one production line into [`Token`]s
//! - **Compiler**: turns a grammar document into a [`Grammar`] (rule graph)
//! - **Cache**: reuses compiled grammars loaded from disk
//!
//! ## Architecture
//!
//! ```text
//! Grammar document
//!     ↓
//! fenced lines ── Lexer (tokenize) ──→ Vec<SpannedToken>
//!     ↓
//! Compiler (one production per line)
//!     ↓
//! Grammar { root, productions }
//! ```
//!
//! ## Example
//!
//! ```rust
//! use trellis_syntax::{compile_grammar, Rule};
//!
//! let document = "Greetings.\n```trellis\nGREETING = 'hello' | 'hi'\n```\n";
//! let grammar = compile_grammar(document).expect("valid grammar");
//!
//! assert_eq!(grammar.len(), 1);
//! assert!(matches!(grammar.root(), Rule::Or(children) if children.len() == 2));
//! ```

pub mod cache;
pub mod compiler;
pub mod error;
pub mod lexer;
pub mod rule;
pub mod text;

pub use cache::{CacheStats, GrammarCache};
pub use compiler::{
    CompileOptions, GrammarCompiler, Production, compile_grammar, compile_grammar_with,
    load_grammar,
};
pub use error::{Diagnostic, GrammarError, Location};
pub use lexer::{SpannedToken, Token, tokenize};
pub use rule::{Grammar, MatchMode, MatchRule, ReferenceRule, Rule};
pub use text::{CharBuffer, Snapshot, Span, TextSource};
