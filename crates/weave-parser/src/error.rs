//! Diagnostics produced while lexing and parsing Weave source.
//!
//! A failed parse yields a [`ParseError`] holding one or more
//! [`Diagnostic`]s. Each diagnostic carries an [`ErrorCode`], a message,
//! labeled source spans and optional help text. The lexer reports every
//! lexical problem it finds in one pass; the grammar stops at the first
//! unmatched token.
//!
//! # Example
//!
//! ```
//! # use weave_parser::error::{Diagnostic, ErrorCode};
//! # use weave_parser::Span;
//!
//! let diag = Diagnostic::error("expected `:` after field name")
//!     .with_code(ErrorCode::E100)
//!     .with_label(Span::new(14..16), "unexpected token")
//!     .with_help("field declarations look like `name: Type`");
//!
//! assert_eq!(diag.to_string(), "error[E100]: expected `:` after field name");
//! ```

mod collector;
mod diagnostic;
mod error_code;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;

use thiserror::Error;

use crate::span::{SourcePosition, Span};

/// Error returned by every parsing entry point.
///
/// Wraps one or more diagnostics in source order.
#[derive(Debug, Error)]
#[error("{}", summarize(.diagnostics))]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    /// Create a new parse error from diagnostics.
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Get all diagnostics in this error.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Span of the first reported problem.
    ///
    /// For syntax errors this is the first token the grammar could not match.
    pub fn span(&self) -> Option<Span> {
        self.diagnostics.first().and_then(Diagnostic::primary_span)
    }

    /// Line and column of the first reported problem within `source`.
    pub fn position(&self, source: &str) -> Option<SourcePosition> {
        self.span().map(|span| span.position(source))
    }
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    match diagnostics {
        [] => String::from("parse failed"),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (+{} more)", rest.len()),
    }
}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::new(vec![diagnostic])
    }
}

impl From<Vec<Diagnostic>> for ParseError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self::new(diagnostics)
    }
}
