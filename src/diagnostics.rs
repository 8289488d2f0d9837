//! Diagnostic reporting for one compilation.
//!
//! The front end never aborts on bad input: every lexical, syntactic, and
//! semantic error is reported through [`Diagnostics`] and parsing continues.
//! Each report is echoed to stderr in a fixed single-line format and recorded
//! so the caller can read the final count and decide whether to keep the
//! emitted code.

use std::fmt;

/// One reported compile error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub col: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-- line {} col {}: {}", self.line, self.col, self.message)
    }
}

/// Collects and echoes diagnostics for one compilation.
#[derive(Debug, Default)]
pub struct Diagnostics {
    reported: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one diagnostic and echo it to stderr.
    pub fn report(&mut self, line: usize, col: usize, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            line,
            col,
            message: message.into(),
        };
        eprintln!("{}", diagnostic);
        self.reported.push(diagnostic);
    }

    /// Number of diagnostics reported so far.
    pub fn count(&self) -> usize {
        self.reported.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reported.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.reported.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_format() {
        let mut diags = Diagnostics::new();
        diags.report(3, 7, "; expected");

        assert_eq!(diags.count(), 1);
        let rendered = diags.iter().next().map(|d| d.to_string());
        assert_eq!(rendered.as_deref(), Some("-- line 3 col 7: ; expected"));
    }

    #[test]
    fn test_count_accumulates() {
        let mut diags = Diagnostics::new();
        assert!(diags.is_empty());
        diags.report(1, 1, "identifier expected");
        diags.report(2, 5, "invalid declaration");
        assert_eq!(diags.count(), 2);
    }
}
