use thiserror::Error;

/// A positioned lexer or parser error. Line and column are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}:{column} {message}")]
pub struct ParseError {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl ParseError {
    pub fn new(line: u32, column: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Per-file diagnostic sink. Errors abort the pipeline for the file,
/// warnings are surfaced but never fatal.
#[derive(Debug, Default)]
pub struct Diagnostics {
    pub errors: Vec<ParseError>,
    pub warnings: Vec<String>,
}

impl Diagnostics {
    pub fn error(&mut self, line: u32, column: u32, message: impl Into<String>) {
        self.errors.push(ParseError::new(line, column, message));
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
