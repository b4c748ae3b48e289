//! CLI module
//!
//! Command-line interface for converting files.
//!
//! # Commands
//!
//! - `convert` - Convert a JSON or JSON Lines file to Parquet
//! - `discover` - Print a typed schema from a warehouse catalog or an input file
//! - `inspect` - Show the schema and first rows of a Parquet file

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
