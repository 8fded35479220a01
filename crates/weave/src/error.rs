//! Error types for Weave operations.
//!
//! [`ModelError`] covers the registry and object model. [`WeaveError`] is the
//! facade error that also carries I/O, syntax and configuration failures.

use std::io;

use thiserror::Error;

use weave_parser::error::ParseError;

/// A registry or object-model operation failed.
///
/// Every failing operation leaves the registry and the objects involved
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("unknown type `{0}`")]
    UnknownType(String),

    #[error("type `{type_name}` has no field `{field}`")]
    UnknownField { type_name: String, field: String },

    #[error("type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch { expected: String, found: String },

    #[error("type `{0}` cannot be instantiated")]
    UnsupportedType(String),

    #[error("index {index} is out of range for an array of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("`{0}` is defined more than once")]
    DuplicateDefinition(String),
}

/// The main error type for Weave operations.
///
/// The `Parse` variant keeps the source text next to the [`ParseError`] so
/// callers can render its diagnostics with snippets.
#[derive(Debug, Error)]
pub enum WeaveError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl WeaveError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
