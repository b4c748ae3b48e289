//! File loading

use super::decoders::decoder_for;
use super::types::DecoderFormat;
use crate::error::{Error, Result};
use crate::ingest::{ingest_data, IngestOptions};
use crate::schema::ColumnPlanSource;
use arrow::record_batch::RecordBatch;
use serde_json::Value;
use std::path::Path;

/// Read every record from a file
pub fn read_records(path: impl AsRef<Path>, format: DecoderFormat) -> Result<Vec<Value>> {
    let path = path.as_ref();
    let body = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::FileNotFound {
            path: path.display().to_string(),
        },
        _ => Error::Io(e),
    })?;

    let records = decoder_for(format).decode(&body)?;
    tracing::debug!(path = %path.display(), records = records.len(), "Read input file");
    Ok(records)
}

/// Load a JSON Lines file and convert it into a batch
pub fn load_json(
    path: impl AsRef<Path>,
    source: &ColumnPlanSource,
    options: &IngestOptions,
) -> Result<RecordBatch> {
    let records = read_records(path, DecoderFormat::Jsonl)?;
    ingest_data(&records, source, options)
}
