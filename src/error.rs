use std::fmt;

use thiserror::Error as ThisError;

type Cause = Box<dyn std::error::Error + Send + Sync>;

/// Positioned failure raised by the reader.
///
/// Lexical problems (bad escapes, unterminated strings, malformed numbers)
/// and expectation failures share this type; they differ only by message.
/// `line` and `column` are 1-based.
#[derive(Debug, ThisError)]
#[error("[{line}:{column}] {message}")]
pub struct Error {
    pub line: usize,
    pub column: usize,
    pub message: String,
    #[source]
    pub cause: Option<Cause>,
}

impl Error {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn expectation(line: usize, column: usize, expected: &str, found: Option<char>) -> Self {
        Self::new(
            line,
            column,
            format!("expected '{expected}' but got '{}'", Found(found)),
        )
    }

    pub fn location(&self) -> (usize, usize) {
        (self.line, self.column)
    }
}

struct Found(Option<char>);

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(ch) if ch.is_control() => write!(f, "{}", ch.escape_default()),
            Some(ch) => write!(f, "{ch}"),
            None => f.write_str("EOF"),
        }
    }
}
