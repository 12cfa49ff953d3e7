//! Error types for query lexing, parsing and flattening.

use std::{error::Error, fmt};

/// Lexer error with position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// Error message.
    pub message: String,
    /// Byte position in input where the error occurred.
    pub position: usize,
    /// The original input string.
    pub input: String,
}

impl LexError {
    /// Creates a new lexer error.
    pub fn new(message: impl Into<String>, position: usize, input: &str) -> Self {
        Self {
            message: message.into(),
            position,
            input: input.to_string(),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "query syntax error: {}", self.message)?;
        writeln!(f, "  {}", self.input)?;
        write!(f, "  {}^", " ".repeat(self.position.min(self.input.len())))
    }
}

impl Error for LexError {}

/// Parse error with optional position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Error message.
    pub message: String,
    /// Byte position in input where the error occurred (if known).
    pub position: Option<usize>,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(message: impl Into<String>, position: Option<usize>) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(pos) => write!(f, "at character {}: {}", pos, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl Error for ParseError {}

/// Semantic error raised while flattening an AST.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlattenError {
    /// A field condition appeared inside another field condition's group,
    /// e.g. `title:(x AND author:y)`.
    #[error("field conditions may not be nested: \"{outer}\" wraps \"{inner}\"")]
    NestedCode {
        /// The enclosing code.
        outer: String,
        /// The code found inside the enclosing group.
        inner: String,
    },

    /// The like operator (`~`) parses but is not supported.
    #[error("the like operator (~) is not supported")]
    UnsupportedLike,
}

/// A unified error type covering the whole string-to-flattened-AST pipeline.
///
/// Carries the original query string so errors can be displayed with a
/// position caret where one is known.
#[derive(Debug, Clone)]
pub struct QueryError {
    /// The kind of error that occurred.
    pub kind: QueryErrorKind,
    /// The original query string (if available).
    pub query: Option<String>,
}

/// The specific kind of query error.
#[derive(Debug, Clone)]
pub enum QueryErrorKind {
    /// Tokenization failed.
    Lex {
        /// Error message.
        message: String,
        /// Byte position in input.
        position: usize,
    },
    /// Invalid syntax.
    Parse {
        /// Error message.
        message: String,
        /// Byte position in input (if known).
        position: Option<usize>,
    },
    /// Invalid semantics (nested codes, unsupported operators).
    Semantic {
        /// Error message.
        message: String,
    },
}

impl QueryError {
    /// Sets the query string for this error.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Returns the error message without context.
    pub fn message(&self) -> &str {
        match &self.kind {
            QueryErrorKind::Lex { message, .. }
            | QueryErrorKind::Parse { message, .. }
            | QueryErrorKind::Semantic { message } => message,
        }
    }

    /// Returns a suggestion for common mistakes.
    pub fn suggestion(&self) -> Option<&'static str> {
        match &self.kind {
            QueryErrorKind::Lex { message, .. } if message.contains("unterminated quote") => {
                Some("Add a closing quote (\") to complete the phrase")
            }
            QueryErrorKind::Parse { message, .. } if message.contains("parenthesis") => {
                Some("Balance every opening parenthesis ( with a closing one )")
            }
            QueryErrorKind::Semantic { message } if message.contains("nested") => {
                Some("Move the inner field condition outside the group, e.g. 'a:(x) b:(y)'")
            }
            _ => None,
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match &self.kind {
            QueryErrorKind::Lex { .. } | QueryErrorKind::Parse { .. } => "query syntax error",
            QueryErrorKind::Semantic { .. } => "query error",
        };

        writeln!(f, "{}: {}", prefix, self.message())?;

        if let Some(query) = &self.query {
            let position = match &self.kind {
                QueryErrorKind::Lex { position, .. } => Some(*position),
                QueryErrorKind::Parse { position, .. } => *position,
                QueryErrorKind::Semantic { .. } => None,
            };

            writeln!(f, "  {query}")?;
            if let Some(pos) = position {
                writeln!(f, "  {}^", " ".repeat(pos.min(query.len())))?;
            }
        }

        if let Some(suggestion) = self.suggestion() {
            write!(f, "hint: {suggestion}")?;
        }

        Ok(())
    }
}

impl Error for QueryError {}

impl From<LexError> for QueryError {
    fn from(err: LexError) -> Self {
        Self {
            kind: QueryErrorKind::Lex {
                message: err.message,
                position: err.position,
            },
            query: Some(err.input),
        }
    }
}

impl From<ParseError> for QueryError {
    fn from(err: ParseError) -> Self {
        Self {
            kind: QueryErrorKind::Parse {
                message: err.message,
                position: err.position,
            },
            query: None,
        }
    }
}

impl From<FlattenError> for QueryError {
    fn from(err: FlattenError) -> Self {
        Self {
            kind: QueryErrorKind::Semantic {
                message: err.to_string(),
            },
            query: None,
        }
    }
}
