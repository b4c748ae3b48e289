//! Parquet file writer
//!
//! Provides utilities for writing Arrow RecordBatches to Parquet files.

use crate::error::{Error, Result};
use arrow::compute::concat_batches;
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Compression codec names accepted in writer options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CompressionCodec {
    None,
    #[default]
    Snappy,
    Gzip,
    Zstd,
    Lz4,
}

/// Writer options as given by the caller, forwarded to the Parquet writer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterOptions {
    /// Compression codec
    pub compression: CompressionCodec,
    /// Maximum rows per row group
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_group_size: Option<usize>,
    /// Dictionary encoding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dictionary: Option<bool>,
    /// Column statistics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<bool>,
    /// Columns whose values partition a dataset directory
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub partition_cols: Vec<String>,
}

impl WriterOptions {
    /// Build the Parquet writer configuration
    pub fn to_writer_config(&self) -> ParquetWriterConfig {
        let mut config = match self.compression {
            CompressionCodec::None => ParquetWriterConfig::new().uncompressed(),
            CompressionCodec::Snappy => ParquetWriterConfig::new(),
            CompressionCodec::Gzip => ParquetWriterConfig::new().gzip(),
            CompressionCodec::Zstd => ParquetWriterConfig::new().zstd(),
            CompressionCodec::Lz4 => ParquetWriterConfig::new().lz4(),
        };
        if let Some(size) = self.row_group_size {
            config = config.with_row_group_size(size);
        }
        if let Some(enabled) = self.dictionary {
            config = config.with_dictionary(enabled);
        }
        if let Some(enabled) = self.statistics {
            config = config.with_statistics(enabled);
        }
        config
    }

    /// Whether output should be a partitioned dataset
    pub fn is_partitioned(&self) -> bool {
        !self.partition_cols.is_empty()
    }
}

/// Configuration for Parquet writer
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    row_group_size: usize,
    dictionary_enabled: bool,
    statistics_enabled: bool,
}

impl ParquetWriterConfig {
    /// Get the compression codec
    #[must_use]
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Get dictionary encoding enabled
    #[must_use]
    pub fn is_dictionary_enabled(&self) -> bool {
        self.dictionary_enabled
    }

    /// Get statistics enabled
    #[must_use]
    pub fn is_statistics_enabled(&self) -> bool {
        self.statistics_enabled
    }

    /// Get row group size
    #[must_use]
    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: 1024 * 1024, // 1M rows
            dictionary_enabled: true,
            statistics_enabled: true,
        }
    }
}

impl ParquetWriterConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set compression algorithm
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set row group size
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Enable or disable dictionary encoding
    #[must_use]
    pub fn with_dictionary(mut self, enabled: bool) -> Self {
        self.dictionary_enabled = enabled;
        self
    }

    /// Enable or disable statistics
    #[must_use]
    pub fn with_statistics(mut self, enabled: bool) -> Self {
        self.statistics_enabled = enabled;
        self
    }

    /// Use no compression
    #[must_use]
    pub fn uncompressed(mut self) -> Self {
        self.compression = Compression::UNCOMPRESSED;
        self
    }

    /// Use ZSTD compression
    #[must_use]
    pub fn zstd(mut self) -> Self {
        self.compression = Compression::ZSTD(parquet::basic::ZstdLevel::default());
        self
    }

    /// Use GZIP compression
    #[must_use]
    pub fn gzip(mut self) -> Self {
        self.compression = Compression::GZIP(parquet::basic::GzipLevel::default());
        self
    }

    /// Use LZ4 (raw) compression
    #[must_use]
    pub fn lz4(mut self) -> Self {
        self.compression = Compression::LZ4_RAW;
        self
    }

    /// Build writer properties
    fn build_properties(&self) -> WriterProperties {
        let mut builder = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size);

        if !self.dictionary_enabled {
            builder = builder.set_dictionary_enabled(false);
        }

        if !self.statistics_enabled {
            builder =
                builder.set_statistics_enabled(parquet::file::properties::EnabledStatistics::None);
        }

        builder.build()
    }
}

/// Parquet file writer
pub struct ParquetWriter {
    /// Arrow writer
    writer: ArrowWriter<File>,
    /// Number of rows written
    rows_written: usize,
}

impl ParquetWriter {
    /// Create a new Parquet writer
    pub fn new(
        path: impl AsRef<Path>,
        schema: &Schema,
        config: &ParquetWriterConfig,
    ) -> Result<Self> {
        let file = File::create(path.as_ref())?;

        let props = config.build_properties();
        let writer = ArrowWriter::try_new(file, Arc::new(schema.clone()), Some(props))?;

        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Write a RecordBatch to the file
    pub fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        self.writer.write(batch)?;
        self.rows_written += batch.num_rows();
        Ok(())
    }

    /// Get the number of rows written so far
    #[must_use]
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Close the writer and finalize the file
    pub fn close(self) -> Result<usize> {
        let rows = self.rows_written;
        self.writer.close()?;
        Ok(rows)
    }
}

/// Concatenate batches sharing one schema into a single table batch
pub fn concat_table(batches: &[RecordBatch]) -> Result<RecordBatch> {
    let first = batches
        .first()
        .ok_or_else(|| Error::output("No batches to write"))?;
    let schema = first.schema();

    if let Some(other) = batches.iter().find(|b| b.schema() != schema) {
        return Err(Error::output(format!(
            "Batches do not share a schema: {} vs {}",
            schema,
            other.schema()
        )));
    }

    if batches.len() == 1 {
        return Ok(first.clone());
    }
    Ok(concat_batches(&schema, batches)?)
}

/// Concatenate batches and write them to a single Parquet file
///
/// Returns the number of rows written.
pub fn write_parquet(
    path: impl AsRef<Path>,
    batches: &[RecordBatch],
    config: &ParquetWriterConfig,
) -> Result<usize> {
    let path = path.as_ref();
    let table = concat_table(batches)?;

    let mut writer = ParquetWriter::new(path, table.schema().as_ref(), config)?;
    writer.write(&table)?;
    let rows = writer.close()?;

    tracing::info!(path = %path.display(), rows, "Wrote Parquet file");
    Ok(rows)
}
