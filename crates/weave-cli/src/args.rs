//! Command-line argument definitions for the Weave CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the input document and how it is read,
//! the configuration file, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the Weave schema tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input Weave file
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Parse the input as a query document instead of a schema
    #[arg(short, long)]
    pub query: bool,

    /// Write the report to this file instead of standard output
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
