//! # Trellis Eval
//!
//! Matches a compiled [`Grammar`](trellis_syntax::Grammar) against a text
//! [`Snapshot`](trellis_syntax::Snapshot) and builds a labeled [`SyntaxTree`].
//!
//! - [`executor`] – the backtracking matcher and [`parse`]
//! - [`tree`] – [`SyntaxNode`] / [`SyntaxTree`]
//! - [`error`] – [`EvalError`], raised for unresolved references and invalid patterns
//! - [`session`] – [`ParseSession`], latest-tree bookkeeping per document

pub mod error;
pub mod executor;
pub mod session;
pub mod tree;

pub use error::{EvalError, EvalErrorKind};
pub use executor::{Context, Executor, Matched, Outcome, ROOT_LABEL, parse};
pub use session::ParseSession;
pub use tree::{SyntaxNode, SyntaxTree};
