//! Partitioned dataset output
//!
//! Writes a table as a Hive-style directory tree, one directory level per
//! partition column: `{dir}/{col}={value}/.../{uuid}.parquet`.

use super::writer::{concat_table, ParquetWriter, ParquetWriterConfig};
use crate::error::{Error, Result, ResultExt};
use arrow::array::{Array, UInt32Array};
use arrow::compute::take_record_batch;
use arrow::record_batch::RecordBatch;
use arrow::util::display::array_value_to_string;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Directory name used for null and empty partition values
///
/// A literal string equal to this name lands in the same directory, as in Hive.
pub const NULL_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

/// Options for writing a partitioned dataset
#[derive(Debug, Clone, Default)]
pub struct DatasetOptions {
    /// Columns to partition by, outermost first
    pub partition_cols: Vec<String>,
    /// Per-file writer settings
    pub writer: ParquetWriterConfig,
}

impl DatasetOptions {
    pub fn new(partition_cols: Vec<String>) -> Self {
        Self {
            partition_cols,
            writer: ParquetWriterConfig::default(),
        }
    }

    #[must_use]
    pub fn with_writer(mut self, writer: ParquetWriterConfig) -> Self {
        self.writer = writer;
        self
    }
}

/// Concatenate batches and write them under `dir`, split by partition values
///
/// Partition columns are encoded in the directory names and dropped from the
/// files. Returns the paths of the files written.
pub fn write_parquet_dataset(
    dir: impl AsRef<Path>,
    batches: &[RecordBatch],
    options: &DatasetOptions,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let table = concat_table(batches)?;
    std::fs::create_dir_all(dir)?;

    if options.partition_cols.is_empty() {
        let path = dir.join(file_name());
        write_file(&path, &table, &options.writer)?;
        return Ok(vec![path]);
    }

    let schema = table.schema();
    let partition_indices = options
        .partition_cols
        .iter()
        .map(|name| {
            schema
                .index_of(name)
                .map_err(|_| Error::output(format!("Partition column '{name}' not in schema")))
        })
        .collect::<Result<Vec<_>>>()?;
    let data_indices: Vec<usize> = (0..schema.fields().len())
        .filter(|i| !partition_indices.contains(i))
        .collect();
    if data_indices.is_empty() {
        return Err(Error::output(
            "Cannot partition by every column, no data columns would remain",
        ));
    }

    let groups = group_rows(&table, &partition_indices)?;
    let mut written = Vec::with_capacity(groups.len());

    for (values, rows) in groups {
        let mut partition_dir = dir.to_path_buf();
        for (name, value) in options.partition_cols.iter().zip(&values) {
            partition_dir.push(format!("{}={}", escape_path_segment(name), value));
        }
        std::fs::create_dir_all(&partition_dir)?;

        let subset = take_record_batch(&table, &UInt32Array::from(rows))?.project(&data_indices)?;
        let path = partition_dir.join(file_name());
        write_file(&path, &subset, &options.writer)?;
        written.push(path);
    }

    tracing::info!(
        dir = %dir.display(),
        partitions = written.len(),
        rows = table.num_rows(),
        "Wrote partitioned dataset"
    );
    Ok(written)
}

/// Row indices per distinct partition key, keys in sorted order
fn group_rows(
    table: &RecordBatch,
    partition_indices: &[usize],
) -> Result<BTreeMap<Vec<String>, Vec<u32>>> {
    let mut groups: BTreeMap<Vec<String>, Vec<u32>> = BTreeMap::new();

    for row in 0..table.num_rows() {
        let key = partition_indices
            .iter()
            .map(|&idx| -> Result<String> {
                let column = table.column(idx);
                if column.is_null(row) {
                    return Ok(NULL_PARTITION.to_string());
                }
                let value = array_value_to_string(column, row)?;
                Ok(if value.is_empty() {
                    NULL_PARTITION.to_string()
                } else {
                    escape_path_segment(&value)
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let row = u32::try_from(row).map_err(|_| Error::output("Too many rows to partition"))?;
        groups.entry(key).or_default().push(row);
    }

    Ok(groups)
}

fn write_file(path: &Path, batch: &RecordBatch, config: &ParquetWriterConfig) -> Result<()> {
    let context = || format!("Failed to write dataset file '{}'", path.display());
    let mut writer =
        ParquetWriter::new(path, batch.schema().as_ref(), config).with_context(context)?;
    writer.write(batch).with_context(context)?;
    writer.close().with_context(context)?;
    tracing::debug!(path = %path.display(), rows = batch.num_rows(), "Wrote dataset file");
    Ok(())
}

fn file_name() -> String {
    format!("{}.parquet", Uuid::new_v4().simple())
}

/// Percent-encode characters that are unsafe in a partition directory name
pub fn escape_path_segment(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        let needs_escape = c.is_ascii_control()
            || matches!(
                c,
                '"' | '#' | '%' | '\'' | '*' | '/' | ':' | '=' | '?' | '\\' | '{' | '[' | ']' | '^'
            );
        if needs_escape {
            escaped.push_str(&format!("%{:02X}", c as u32));
        } else {
            escaped.push(c);
        }
    }
    escaped
}
