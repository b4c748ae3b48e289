// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]

//! # json2parquet
//!
//! Schema-driven conversion of JSON records into Arrow RecordBatches and
//! Parquet files.
//!
//! ## Features
//!
//! - **Column Plans**: no schema, a list of names, a rename map, or a typed schema
//! - **Typed Coercion**: timestamps, days-since-epoch dates, checked numeric narrowing,
//!   numeric booleans and exact decimals
//! - **Parquet Output**: single files or Hive-partitioned datasets
//! - **Schema Discovery**: typed schemas from Redshift, PostgreSQL or DuckDB catalogs
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use json2parquet::{ingest_data, write_parquet, ColumnPlanSource, IngestOptions};
//! use json2parquet::output::ParquetWriterConfig;
//! use serde_json::json;
//!
//! let records = vec![json!({"foo": 1, "bar": 2}), json!({"foo": 10, "bar": 20})];
//! let batch = ingest_data(&records, &ColumnPlanSource::None, &IngestOptions::default())?;
//! write_parquet("out.parquet", &[batch], &ParquetWriterConfig::default())?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! records ──► schema::resolve ──► ColumnPlan
//!                                     │
//!                                     ▼
//!                ingest::convert ──► RecordBatch ──► output::write_parquet
//!                                                 └► output::write_parquet_dataset
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Column plan resolution
pub mod schema;

/// Record to column conversion
pub mod ingest;

/// Input file decoders (JSON, JSONL)
pub mod decode;

/// Parquet output
pub mod output;

/// Warehouse column catalogs
pub mod catalog;

/// Conversion configuration
pub mod config;

/// End-to-end file conversion
pub mod pipeline;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use catalog::{schema_from_catalog, ColumnCatalog, DuckDbCatalog};
pub use config::ConvertConfig;
pub use decode::load_json;
pub use ingest::{convert, ingest, ingest_data, IngestOptions, Ingested, TimestampFallback};
pub use output::{read_parquet, write_parquet, write_parquet_dataset, WriterOptions};
pub use pipeline::{convert_json, ConvertReport};
pub use schema::{resolve, ColumnPlan, ColumnPlanSource};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
