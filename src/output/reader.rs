//! Parquet file reader

use crate::error::{Error, Result};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use std::path::Path;

/// Read a Parquet file back into a single batch
///
/// A file with no row groups yields an empty batch with the file schema.
pub fn read_parquet(path: impl AsRef<Path>) -> Result<RecordBatch> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::FileNotFound {
            path: path.display().to_string(),
        },
        _ => Error::Io(e),
    })?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let batches = builder
        .build()?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let table = if batches.is_empty() {
        RecordBatch::new_empty(schema)
    } else {
        arrow::compute::concat_batches(&schema, &batches)?
    };

    tracing::debug!(path = %path.display(), rows = table.num_rows(), "Read Parquet file");
    Ok(table)
}
