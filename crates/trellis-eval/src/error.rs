//! Matching errors.
//!
//! A rule that simply does not match is not an error; it is the `None` outcome
//! the engine backtracks on. [`EvalError`] covers the cases that must abort a
//! parse: a reference to a production that does not exist, or a regex terminal
//! whose pattern does not compile. Both are only discovered when the offending
//! rule is actually reached.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalErrorKind {
    /// A reference named a production the grammar does not define.
    UnresolvedReference { name: String },
    /// A `^`-prefixed terminal is not a valid regular expression.
    InvalidPattern { pattern: String, reason: String },
}

/// An error that aborts matching, with the input offset where it was hit.
///
/// Raised through [`bail_at!`] and carried inside an [`anyhow::Error`];
/// callers recover it with `downcast_ref::<EvalError>()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Character offset in the input at which the rule was attempted.
    pub offset: Option<usize>,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind, offset: Option<usize>) -> Self {
        Self { kind, offset }
    }

    pub fn unresolved(name: impl Into<String>, offset: usize) -> Self {
        Self::new(
            EvalErrorKind::UnresolvedReference { name: name.into() },
            Some(offset),
        )
    }

    /// Name of the missing production, for unresolved references.
    pub fn missing_production(&self) -> Option<&str> {
        match &self.kind {
            EvalErrorKind::UnresolvedReference { name } => Some(name),
            EvalErrorKind::InvalidPattern { .. } => None,
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            EvalErrorKind::UnresolvedReference { name } => {
                write!(f, "reference to undefined production '{}'", name)?
            }
            EvalErrorKind::InvalidPattern { pattern, reason } => {
                write!(f, "invalid pattern '{}': {}", pattern, reason)?
            }
        }
        if let Some(offset) = self.offset {
            write!(f, " at offset {}", offset)?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

/// Bail out of an engine function with an [`EvalError`].
///
/// # Usage
/// ```ignore
/// bail_at!(cursor, EvalErrorKind::UnresolvedReference { name });
/// ```
#[macro_export]
macro_rules! bail_at {
    ($offset:expr, $kind:expr) => {
        return Err(anyhow::anyhow!($crate::error::EvalError::new(
            $kind,
            Some($offset)
        )))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_offset() {
        let err = EvalError::unresolved("MISSING", 4);
        assert_eq!(
            err.to_string(),
            "reference to undefined production 'MISSING' at offset 4"
        );
    }

    #[test]
    fn display_without_offset() {
        let err = EvalError::new(
            EvalErrorKind::InvalidPattern {
                pattern: "^(".to_string(),
                reason: "unclosed group".to_string(),
            },
            None,
        );
        assert_eq!(err.to_string(), "invalid pattern '^(': unclosed group");
        assert!(err.missing_production().is_none());
    }

    #[test]
    fn bail_at_produces_downcastable_error() {
        fn try_bail() -> anyhow::Result<()> {
            bail_at!(
                7,
                EvalErrorKind::UnresolvedReference {
                    name: "X".to_string()
                }
            );
        }
        let err = try_bail().unwrap_err();
        let eval_err = err.downcast_ref::<EvalError>().unwrap();
        assert_eq!(eval_err.offset, Some(7));
        assert_eq!(eval_err.missing_production(), Some("X"));
    }
}
