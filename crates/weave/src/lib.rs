//! Weave - A schema language with a typed, observable object model
//!
//! This library parses Weave schema and query documents, loads schema
//! definitions into a type [`registry`], and builds typed [`object`]s whose
//! changes are delivered to observers in batches ([`observe`]).

pub mod config;
pub mod load;
pub mod object;
pub mod observe;
pub mod registry;
pub mod types;

mod error;

pub use weave_core::{identifier, value};
pub use weave_parser::ast;

pub use error::{ModelError, WeaveError};

use log::{debug, info, trace};

use config::AppConfig;
use load::LoadSummary;
use registry::Registry;

/// Entry point for parsing Weave documents and loading schemas.
///
/// # Examples
///
/// ```rust
/// use weave::{SchemaLoader, config::AppConfig};
///
/// let loader = SchemaLoader::new(AppConfig::default());
/// let mut registry = loader.registry().expect("valid config");
///
/// let (schema, summary) = loader
///     .load("type Department { name: String! }", &mut registry)
///     .expect("Failed to load");
///
/// assert_eq!(schema.definitions.len(), 1);
/// assert_eq!(summary.types.len(), 1);
/// assert!(registry.create("Department").is_ok());
/// ```
#[derive(Debug, Default)]
pub struct SchemaLoader {
    config: AppConfig,
}

impl SchemaLoader {
    /// Create a new loader with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// A fresh registry holding the built-in scalars and the configured ones.
    ///
    /// # Errors
    ///
    /// Returns `WeaveError::Config` if a configured scalar name is invalid.
    pub fn registry(&self) -> Result<Registry, WeaveError> {
        let scalars = self
            .config
            .registry
            .scalars()
            .map_err(WeaveError::Config)?;
        debug!(extra_scalars = scalars.len(); "Creating registry");
        Ok(Registry::with_scalars(
            scalars.iter().map(ToString::to_string),
        ))
    }

    /// Parse a schema document.
    ///
    /// # Errors
    ///
    /// Returns `WeaveError::Parse` with the source attached on lexical or
    /// syntax errors.
    pub fn parse(&self, source: &str) -> Result<ast::Schema, WeaveError> {
        info!("Parsing schema");
        let schema = weave_parser::parse_schema(source)
            .map_err(|err| WeaveError::new_parse_error(err, source))?;
        debug!(definitions = schema.definitions.len(); "Schema parsed successfully");
        trace!(schema:?; "Schema AST");
        Ok(schema)
    }

    /// Parse a query document.
    ///
    /// # Errors
    ///
    /// See [`parse`](Self::parse).
    pub fn parse_query(&self, source: &str) -> Result<ast::Query, WeaveError> {
        info!("Parsing query");
        let query = weave_parser::parse_query(source)
            .map_err(|err| WeaveError::new_parse_error(err, source))?;
        debug!(selections = query.selections.len(); "Query parsed successfully");
        trace!(query:?; "Query AST");
        Ok(query)
    }

    /// Parse a schema document and register its definitions in `registry`.
    /// Returns the parsed document along with what was registered.
    ///
    /// # Errors
    ///
    /// Returns `WeaveError::Parse` for invalid documents and
    /// `WeaveError::Model` for duplicate definitions. The registry is left
    /// unchanged on error.
    pub fn load(
        &self,
        source: &str,
        registry: &mut Registry,
    ) -> Result<(ast::Schema, LoadSummary), WeaveError> {
        let schema = self.parse(source)?;
        let summary = load::load_schema(&schema, registry)?;

        for unresolved in registry.unresolved_references() {
            debug!(reference = unresolved.to_string(); "Unresolved field type");
        }
        Ok((schema, summary))
    }
}
