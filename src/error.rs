//! Error types for path compilation.

use std::fmt;

/// Errors that can occur while compiling a path expression.
///
/// Evaluation never fails; a query that matches nothing returns an empty
/// result rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The expression could not be lexed. The message carries the absolute
    /// character offset of the failure and a quoted context window.
    Syntax { message: String },
    /// A filter was opened but its closing `)]` never arrived. The lexer
    /// reports this first, so this variant is a defensive backstop.
    MissingFilterEnd,
    /// The lexeme stream contained a shape the compiler could not interpret.
    InvalidPath,
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::Syntax { message } => write!(f, "{}", message),
            PathError::MissingFilterEnd => write!(f, "missing end of filter"),
            PathError::InvalidPath => write!(f, "invalid path syntax"),
        }
    }
}

impl std::error::Error for PathError {}
