//! # Weave Parser
//!
//! Front end for the Weave schema language: source text to AST.
//!
//! ## Usage
//!
//! ```
//! # use weave_parser::{parse_schema, ParseError};
//! fn main() -> Result<(), ParseError> {
//!     let schema = parse_schema("type Position { id: ID! }")?;
//!
//!     assert_eq!(schema.definitions.len(), 1);
//!     Ok(())
//! }
//! ```
//!
//! The pipeline is:
//!
//! 1. **Tokenize** - [`lexer::tokenize`] turns text into tokens
//! 2. **Parse** - [`grammar`] matches the tokens against the PEG grammar and
//!    produces a [`parse_tree::ParseNode`] tree
//! 3. **Build** - [`builder`] turns the parse tree into [`ast`] values

pub mod ast;
pub mod builder;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parse_tree;
pub mod span;
pub mod tokens;

pub use error::ParseError;
pub use span::{SourcePosition, Span, Spanned};

use ast::{Query, Schema};

/// Parse a schema document into a [`Schema`].
///
/// # Errors
///
/// Returns every lexical error found, or the first syntax error. The first
/// diagnostic's span locates the problem; see [`ParseError::position`].
pub fn parse_schema(source: &str) -> Result<Schema, ParseError> {
    let tokens = lexer::tokenize(source)?;
    let tree = grammar::parse_schema_tree(&tokens)?;
    let schema = builder::build_schema(tree);
    log::debug!(definitions = schema.definitions.len(); "Parsed schema");
    Ok(schema)
}

/// Parse a query document, `{ field ... }`, into a [`Query`].
///
/// # Errors
///
/// See [`parse_schema`].
pub fn parse_query(source: &str) -> Result<Query, ParseError> {
    let tokens = lexer::tokenize(source)?;
    let tree = grammar::parse_query_tree(&tokens)?;
    let query = builder::build_query(tree);
    log::debug!(selections = query.selections.len(); "Parsed query");
    Ok(query)
}
