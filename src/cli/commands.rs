//! CLI commands and argument parsing

use crate::catalog::CatalogBackend;
use crate::decode::DecoderFormat;
use crate::ingest::TimestampFallback;
use crate::output::CompressionCodec;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Convert JSON records to Parquet
#[derive(Parser, Debug)]
#[command(name = "json2parquet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Conversion config file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format for command results
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a JSON or JSON Lines file to Parquet
    Convert {
        /// Input file
        input: PathBuf,

        /// Output file, or dataset directory when partitioning
        output: PathBuf,

        /// Input layout
        #[arg(long)]
        input_format: Option<DecoderFormat>,

        /// Inline schema JSON (name list, name map or {"fields": [...]})
        #[arg(long)]
        schema: Option<String>,

        /// Rename a column, as SOURCE=OUTPUT (repeatable)
        #[arg(long = "alias", value_parser = parse_alias)]
        aliases: Vec<(String, String)>,

        /// strftime-style format for timestamp columns
        #[arg(long)]
        date_format: Option<String>,

        /// Policy for timestamps that cannot be converted
        #[arg(long)]
        timestamp_fallback: Option<TimestampFallback>,

        /// Parquet compression codec
        #[arg(long)]
        compression: Option<CompressionCodec>,

        /// Maximum rows per row group
        #[arg(long)]
        row_group_size: Option<usize>,

        /// Partition columns (comma-separated)
        #[arg(long, value_delimiter = ',')]
        partition_cols: Vec<String>,
    },

    /// Print a typed schema for a warehouse table or an input file
    Discover {
        /// Infer column types from this input file instead of a catalog
        #[arg(long, conflicts_with_all = ["backend", "uri", "table"])]
        input: Option<PathBuf>,

        /// Input layout (with --input)
        #[arg(long, requires = "input")]
        input_format: Option<DecoderFormat>,

        /// Catalog backend
        #[arg(long, required_unless_present = "input")]
        backend: Option<CatalogBackend>,

        /// Connection URI or database file
        #[arg(long, required_unless_present = "input")]
        uri: Option<String>,

        /// Database schema holding the table
        #[arg(long = "db-schema", default_value = "public")]
        db_schema: String,

        /// Table name
        #[arg(long, required_unless_present = "input")]
        table: Option<String>,

        /// Partition columns to exclude (comma-separated)
        #[arg(long, value_delimiter = ',')]
        partition_columns: Vec<String>,
    },

    /// Show the schema and first rows of a Parquet file
    Inspect {
        /// Parquet file
        path: PathBuf,

        /// Number of rows to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

/// Parse a `SOURCE=OUTPUT` alias
fn parse_alias(value: &str) -> std::result::Result<(String, String), String> {
    match value.split_once('=') {
        Some((source, output)) if !source.is_empty() && !output.is_empty() => {
            Ok((source.to_string(), output.to_string()))
        }
        _ => Err(format!("expected SOURCE=OUTPUT, got '{value}'")),
    }
}
