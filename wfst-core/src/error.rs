//! The closed error taxonomy surfaced by this crate and by `wfst-regex`.
//!
//! Every error carries a diagnostic payload of `(message, line, column, source)`
//! so that a caller driving a regex or rule script can print a caret under the
//! offending token, the way a compiler front end would.

use std::fmt;

/// A single source-position diagnostic attached to an error.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub source: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (line {}, column {})",
            self.message, self.line, self.column
        )
    }
}

/// The single error kind produced anywhere in `wfst-core` / `wfst-regex`.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum WfstError {
    /// Malformed weight, unterminated class, unterminated quote.
    #[error("lex error: {0}")]
    Lex(Diagnostic),
    /// Unbalanced parentheses, dangling operator, empty stack after reduction.
    #[error("parse error: {0}")]
    Parse(Diagnostic),
    /// Undefined variable, undefined function, inverted character range, `{m,n}` with m>n.
    #[error("semantic error: {0}")]
    Semantic(Diagnostic),
    /// Library-level errors: incompatible arity, missing nonterminal in a grammar, etc.
    #[error("operation error: {0}")]
    Operation(Diagnostic),
}

impl WfstError {
    pub fn lex(message: impl Into<String>, line: usize, column: usize, source: impl Into<String>) -> Self {
        WfstError::Lex(Diagnostic { message: message.into(), line, column, source: source.into() })
    }

    pub fn parse(message: impl Into<String>, line: usize, column: usize, source: impl Into<String>) -> Self {
        WfstError::Parse(Diagnostic { message: message.into(), line, column, source: source.into() })
    }

    pub fn semantic(message: impl Into<String>, line: usize, column: usize, source: impl Into<String>) -> Self {
        WfstError::Semantic(Diagnostic { message: message.into(), line, column, source: source.into() })
    }

    pub fn operation(message: impl Into<String>) -> Self {
        WfstError::Operation(Diagnostic {
            message: message.into(),
            line: 0,
            column: 0,
            source: String::new(),
        })
    }
}

pub type WfstResult<T> = Result<T, WfstError>;
