//! Weave CLI library
//!
//! This module contains the core CLI logic for the Weave schema tool.

pub mod error_adapter;

mod args;
mod config;
mod report;

pub use args::Args;

use std::fs;

use log::{info, warn};

use weave::{SchemaLoader, WeaveError, config::OutputFormat};

use report::{QueryTree, RegistrySummary, SchemaTree};

/// Run the Weave CLI application
///
/// Parses the input file as a schema (or as a query with `--query`). Schemas
/// are loaded into a fresh registry. The report holds the document in the
/// configured output format, followed by the registered types for schemas.
///
/// # Errors
///
/// Returns `WeaveError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
/// - Duplicate definitions in the schema
pub fn run(args: &Args) -> Result<(), WeaveError> {
    info!(input_path = args.input, query = args.query; "Processing document");

    let app_config = config::load_config(args.config.as_ref())?;
    let format = app_config.output.format;

    let source = fs::read_to_string(&args.input)?;

    let loader = SchemaLoader::new(app_config);
    let report = if args.query {
        let query = loader.parse_query(&source)?;
        match format {
            OutputFormat::Tree => QueryTree(&query).to_string(),
            OutputFormat::Debug => format!("{query}\n"),
        }
    } else {
        let mut registry = loader.registry()?;
        let (schema, _) = loader.load(&source, &mut registry)?;

        for unresolved in registry.unresolved_references() {
            warn!("{unresolved}");
        }

        let document = match format {
            OutputFormat::Tree => SchemaTree(&schema).to_string(),
            OutputFormat::Debug => format!("{schema}\n"),
        };
        format!("{document}\n{}", RegistrySummary(&registry))
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &report)?;
            info!(output_file = path.as_str(); "Report written");
        }
        None => print!("{report}"),
    }

    Ok(())
}
