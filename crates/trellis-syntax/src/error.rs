use std::fmt;

/// Position of a problem inside a grammar document.
///
/// `line` is 1-based (document line), `column` is a 0-based character column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column + 1)
    }
}

/// A structural problem that aborts grammar compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    MissingProductionName { found: String, location: Location },
    ExpectedEquals { found: Option<String>, location: Location },
    UnterminatedString { location: Location },
    InvalidReference { name: String, location: Location },
    UnexpectedToken { found: String, location: Location },
    DuplicateProduction { name: String, location: Location },
}

impl GrammarError {
    pub fn location(&self) -> Location {
        match self {
            GrammarError::MissingProductionName { location, .. } => *location,
            GrammarError::ExpectedEquals { location, .. } => *location,
            GrammarError::UnterminatedString { location } => *location,
            GrammarError::InvalidReference { location, .. } => *location,
            GrammarError::UnexpectedToken { location, .. } => *location,
            GrammarError::DuplicateProduction { location, .. } => *location,
        }
    }

    /// Short hint shown under the diagnostic.
    pub fn help(&self) -> &'static str {
        match self {
            GrammarError::MissingProductionName { .. } => {
                "productions start with a name made of letters, digits and '_'"
            }
            GrammarError::ExpectedEquals { .. } => "productions look like NAME = term term ...",
            GrammarError::UnterminatedString { .. } => "close the literal with a single quote",
            GrammarError::InvalidReference { .. } => {
                "references may only contain letters, digits and '_'; quote literal text"
            }
            GrammarError::UnexpectedToken { .. } => {
                "only quoted literals, names and '|' may follow '='"
            }
            GrammarError::DuplicateProduction { .. } => "rename or merge the two productions",
        }
    }
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: ", self.location().line)?;
        match self {
            GrammarError::MissingProductionName { found, .. } => {
                write!(f, "expected production name, found '{}'", found)
            }
            GrammarError::ExpectedEquals { found: Some(found), .. } => {
                write!(f, "expected '=' after production name, found {}", found)
            }
            GrammarError::ExpectedEquals { found: None, .. } => {
                write!(f, "expected '=' after production name, found end of line")
            }
            GrammarError::UnterminatedString { .. } => write!(f, "unterminated string literal"),
            GrammarError::InvalidReference { name, .. } => {
                write!(f, "invalid reference name '{}'", name)
            }
            GrammarError::UnexpectedToken { found, .. } => {
                write!(f, "unexpected {}", found)
            }
            GrammarError::DuplicateProduction { name, .. } => {
                write!(f, "duplicate production '{}'", name)
            }
        }
    }
}

impl std::error::Error for GrammarError {}

/// A [`GrammarError`] paired with the document it came from, for rendering.
pub struct Diagnostic<'a> {
    source: &'a str,
    error: &'a GrammarError,
}

impl<'a> Diagnostic<'a> {
    pub fn new(source: &'a str, error: &'a GrammarError) -> Self {
        Self { source, error }
    }

    /// Multi-line report: the error message, then the [`excerpt`](Self::excerpt).
    pub fn format_error(&self) -> String {
        let mut output = format!("error: {}\n", self.error);
        if let Some(excerpt) = self.excerpt() {
            output.push_str(&excerpt);
        }
        output
    }

    /// The offending line in a numbered gutter with a caret under the column
    /// and the error's help text. `None` when the line is not in `source`.
    pub fn excerpt(&self) -> Option<String> {
        let location = self.error.location();
        let line = self.source.lines().nth(location.line.checked_sub(1)?)?;

        let width = location.line.to_string().len();
        let mut output = format!("{: >width$} |\n", "", width = width);
        output.push_str(&format!("{} | {}\n", location.line, line));

        let visual: usize = line
            .chars()
            .take(location.column)
            .map(|ch| if ch == '\t' { 4 } else { 1 })
            .sum();
        output.push_str(&format!(
            "{: >width$} | {}^ {}\n",
            "",
            " ".repeat(visual),
            self.error.help(),
            width = width
        ));

        Some(output)
    }
}

impl fmt::Display for Diagnostic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_error())
    }
}
