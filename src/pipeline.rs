//! End-to-end conversion
//!
//! Reads an input file, converts it into a batch and writes Parquet.

use crate::decode::{read_records, DecoderFormat};
use crate::error::Result;
use crate::ingest::{ingest, IngestOptions, IngestWarning};
use crate::output::{write_parquet, write_parquet_dataset, DatasetOptions, WriterOptions};
use crate::schema::ColumnPlanSource;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Outcome of a conversion
#[derive(Debug, Clone)]
pub struct ConvertReport {
    /// Rows written
    pub rows: usize,
    /// Columns in the written schema, partition columns included
    pub columns: usize,
    /// Parquet files written
    pub files: Vec<PathBuf>,
    /// Values replaced by the timestamp fallback
    pub warnings: Vec<IngestWarning>,
}

/// Convert a JSON Lines file to Parquet
///
/// Writes a single file at `output`, or a partitioned dataset under the
/// `output` directory when `writer.partition_cols` is set.
pub fn convert_json(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    source: &ColumnPlanSource,
    ingest_options: &IngestOptions,
    writer: &WriterOptions,
) -> Result<ConvertReport> {
    convert_file(
        input,
        output,
        DecoderFormat::Jsonl,
        source,
        ingest_options,
        writer,
    )
}

/// Convert an input file of the given layout to Parquet
pub fn convert_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    format: DecoderFormat,
    source: &ColumnPlanSource,
    ingest_options: &IngestOptions,
    writer: &WriterOptions,
) -> Result<ConvertReport> {
    let (input, output) = (input.as_ref(), output.as_ref());
    let start = Instant::now();

    let records = read_records(input, format)?;
    let ingested = ingest(&records, source, ingest_options)?;
    let batch = ingested.batch;
    let config = writer.to_writer_config();

    let files = if writer.is_partitioned() {
        let options = DatasetOptions::new(writer.partition_cols.clone()).with_writer(config);
        write_parquet_dataset(output, std::slice::from_ref(&batch), &options)?
    } else {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        write_parquet(output, std::slice::from_ref(&batch), &config)?;
        vec![output.to_path_buf()]
    };

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        rows = batch.num_rows(),
        files = files.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Conversion complete"
    );

    Ok(ConvertReport {
        rows: batch.num_rows(),
        columns: batch.num_columns(),
        files,
        warnings: ingested.warnings,
    })
}
