//! Parse errors

use thiserror::Error;

use semio_ast::StrictError;

/// Front-end failures
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot read program {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("unlexable input at line {line}")]
    Lex { line: usize },

    #[error("line {line}: expected {expected}, found {found}")]
    Unexpected {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("unexpected end of input: expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("line {line}: unknown operator '{name}' (allowed: Add, Sign, JitterU)")]
    UnknownOperator { line: usize, name: String },

    #[error("line {line}: operator '{name}' requires a numeric argument")]
    MissingOperatorArg { line: usize, name: String },

    #[error("line {line}: operator '{name}' takes no argument")]
    UnexpectedOperatorArg { line: usize, name: String },

    #[error("line {line}: unknown effect '{name}' (allowed: add_bias)")]
    UnknownEffect { line: usize, name: String },

    #[error("line {line}: seed must be a non-negative integer")]
    InvalidSeed { line: usize },

    #[error("missing 'context ... {{ ... }}' block")]
    MissingContext,

    #[error(transparent)]
    Strict(#[from] StrictError),
}
