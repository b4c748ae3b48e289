//! Output module
//!
//! Handles Parquet file writing and reading.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Writing batches to a single Parquet file
//! - Writing Hive-partitioned Parquet datasets
//! - Reading Parquet files back into a batch

mod dataset;
mod reader;
mod writer;

pub use dataset::{escape_path_segment, write_parquet_dataset, DatasetOptions, NULL_PARTITION};
pub use reader::read_parquet;
pub use writer::{
    concat_table, write_parquet, CompressionCodec, ParquetWriter, ParquetWriterConfig,
    WriterOptions,
};

#[cfg(test)]
mod tests;
