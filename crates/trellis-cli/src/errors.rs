use colored::*;
use std::fmt;
use trellis_eval::{EvalError, EvalErrorKind};
use trellis_syntax::{Diagnostic, GrammarError, Location};

/// Error with context and suggestions, rendered for humans on stderr
pub struct EnhancedError {
    pub message: String,
    pub location: Option<Location>,
    pub file: Option<String>,
    pub excerpt: Option<String>,
    pub suggestion: Option<String>,
    pub help: Option<String>,
}

impl EnhancedError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            file: None,
            excerpt: None,
            suggestion: None,
            help: None,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Source lines with a caret, as rendered by [`Diagnostic::excerpt`].
    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}", "error:".red().bold(), self.message.bold());

        if let Some(file) = &self.file {
            match &self.location {
                Some(location) => eprintln!(
                    "  {} {}:{}:{}",
                    "-->".blue().bold(),
                    file,
                    location.line,
                    location.column + 1
                ),
                None => eprintln!("  {} {}", "-->".blue().bold(), file),
            }
        }

        if let Some(excerpt) = &self.excerpt {
            eprintln!();
            for line in excerpt.lines() {
                match line.split_once(" | ") {
                    Some((gutter, rest)) if line.contains('^') && gutter.trim().is_empty() => {
                        eprintln!("{} {} {}", gutter, "|".blue().bold(), rest.red().bold())
                    }
                    Some((gutter, rest)) => {
                        eprintln!("{} {} {}", gutter.blue().bold(), "|".blue().bold(), rest)
                    }
                    None => eprintln!("{}", line.blue().bold()),
                }
            }
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!();
            eprintln!("{} {}", "suggestion:".green().bold(), suggestion);
        }

        if let Some(help) = &self.help {
            eprintln!();
            eprintln!("{} {}", "help:".cyan().bold(), help);
        }
    }
}

impl fmt::Display for EnhancedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for EnhancedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnhancedError: {}", self.message)
    }
}

impl std::error::Error for EnhancedError {}

/// Convert anyhow::Error to EnhancedError, attaching location and hints the
/// error type knows about
pub fn enhance_error(
    err: &anyhow::Error,
    file: Option<String>,
    source: Option<String>,
) -> EnhancedError {
    let mut enhanced = EnhancedError::new(format!("{:#}", err));

    if let Some(file) = file {
        enhanced = enhanced.with_file(file);
    }

    if let Some(grammar_err) = err.downcast_ref::<GrammarError>() {
        enhanced = enhanced.with_location(grammar_err.location());
        // The excerpt already ends with the help text.
        match source
            .as_deref()
            .and_then(|source| Diagnostic::new(source, grammar_err).excerpt())
        {
            Some(excerpt) => enhanced = enhanced.with_excerpt(excerpt),
            None => enhanced = enhanced.with_help(grammar_err.help()),
        }
        if let GrammarError::DuplicateProduction { name, .. } = grammar_err {
            enhanced = enhanced.with_suggestion(format!(
                "Combine both bodies with '|': {} = ... | ...",
                name
            ));
        }
    } else if let Some(eval_err) = err.downcast_ref::<EvalError>() {
        match &eval_err.kind {
            EvalErrorKind::UnresolvedReference { name } => {
                enhanced = enhanced
                    .with_suggestion(format!("Define the production: {} = ...", name))
                    .with_help("References are resolved when the parser reaches them");
            }
            EvalErrorKind::InvalidPattern { .. } => {
                enhanced = enhanced
                    .with_suggestion("Check the regular expression after the leading '^'")
                    .with_help("Patterns use the syntax of the regex crate");
            }
        }
    }

    enhanced
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_syntax::compile_grammar;

    #[test]
    fn test_grammar_error_gets_location() {
        let err = compile_grammar("```trellis\nA = 'x\n```\n").unwrap_err();
        let enhanced = enhance_error(&anyhow::Error::new(err), Some("g.md".into()), None);

        assert_eq!(enhanced.location, Some(Location::new(2, 4)));
        assert!(enhanced.help.is_some());
        assert!(enhanced.excerpt.is_none());
        assert!(enhanced.message.contains("unterminated string literal"));
    }

    #[test]
    fn test_grammar_error_excerpt_from_source() {
        let source = "```trellis\nA = 'x\n```\n";
        let err = compile_grammar(source).unwrap_err();
        let expected = Diagnostic::new(source, &err).excerpt();
        let enhanced = enhance_error(&anyhow::Error::new(err), None, Some(source.to_string()));

        assert_eq!(enhanced.excerpt, expected);
        assert!(enhanced.excerpt.unwrap().contains("2 | A = 'x"));
        assert!(enhanced.help.is_none());
    }

    #[test]
    fn test_eval_error_gets_suggestion() {
        let err = anyhow::Error::new(EvalError::unresolved("NUMBER", 3));
        let enhanced = enhance_error(&err, None, None);

        assert!(enhanced.location.is_none());
        assert_eq!(
            enhanced.suggestion.as_deref(),
            Some("Define the production: NUMBER = ...")
        );
    }

    #[test]
    fn test_context_is_kept_in_message() {
        let err = anyhow::anyhow!("not found").context("Failed to read input");
        let enhanced = enhance_error(&err, None, None);
        assert_eq!(enhanced.message, "Failed to read input: not found");
    }
}
