//! Grammars embedded in Markdown, matched by a backtracking parser.
//!
//! ```rust
//! use trellis::prelude::*;
//!
//! let grammar = compile_grammar("```trellis\nSUM = '^[0-9]+' '+' '^[0-9]+'\n```\n")?;
//! let tree = parse(&grammar, &Snapshot::new("1 + 2"))?;
//!
//! assert_eq!(tree.root().label(), "ROOT");
//! assert_eq!(tree.root().children().len(), 3);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub use trellis_eval::{EvalError, EvalErrorKind, ParseSession, SyntaxNode, SyntaxTree, parse};
pub use trellis_syntax::{
    CompileOptions, Diagnostic, Grammar, GrammarCache, GrammarError, Location, Rule, Snapshot,
    Span, TextSource, compile_grammar, compile_grammar_with, load_grammar,
};
pub use trellis_syntax;
pub use trellis_eval;

pub mod prelude {
    pub use crate::{compile_grammar, compile_grammar_with, load_grammar, parse};
    pub use crate::{CompileOptions, Grammar, ParseSession, Snapshot, SyntaxNode, SyntaxTree};
}
