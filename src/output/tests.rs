//! Tests for output module

use super::*;
use crate::error::Error;
use crate::ingest::{ingest_data, IngestOptions};
use crate::schema::ColumnPlanSource;
use crate::types::{TypeDescriptor, TypedField, TypedSchema};
use arrow::array::{Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, TimeUnit};
use arrow::record_batch::RecordBatch;
use parquet::basic::Compression;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::path::Path;
use tempfile::tempdir;

fn batch_from(records: &[Value]) -> RecordBatch {
    ingest_data(records, &ColumnPlanSource::None, &IngestOptions::default()).unwrap()
}

fn sales_batch() -> RecordBatch {
    batch_from(&[
        json!({"region": "east", "year": 2023, "amount": 10}),
        json!({"region": "west", "year": 2023, "amount": 20}),
        json!({"region": "east", "year": 2024, "amount": 30}),
        json!({"region": null, "year": 2024, "amount": 40}),
    ])
}

fn ids(batch: &RecordBatch, name: &str) -> Vec<Option<i64>> {
    batch
        .column_by_name(name)
        .unwrap()
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap()
        .iter()
        .collect()
}

fn relative_dir(root: &Path, file: &Path) -> String {
    file.parent()
        .unwrap()
        .strip_prefix(root)
        .unwrap()
        .to_string_lossy()
        .replace('\\', "/")
}

// ============================================================================
// Writer Config Tests
// ============================================================================

#[test]
fn test_parquet_writer_config_default() {
    let config = ParquetWriterConfig::default();
    assert!(config.is_dictionary_enabled());
    assert!(config.is_statistics_enabled());
    assert_eq!(config.compression(), Compression::SNAPPY);
}

#[test]
fn test_parquet_writer_config_builder() {
    let config = ParquetWriterConfig::new()
        .with_row_group_size(1000)
        .with_dictionary(false)
        .with_statistics(false)
        .uncompressed();

    assert!(!config.is_dictionary_enabled());
    assert!(!config.is_statistics_enabled());
    assert_eq!(config.row_group_size(), 1000);
    assert_eq!(config.compression(), Compression::UNCOMPRESSED);
}

#[test]
fn test_writer_options_forwarded() {
    let options = WriterOptions {
        compression: CompressionCodec::Lz4,
        row_group_size: Some(500),
        dictionary: Some(false),
        statistics: None,
        partition_cols: vec![],
    };
    let config = options.to_writer_config();

    assert_eq!(config.compression(), Compression::LZ4_RAW);
    assert_eq!(config.row_group_size(), 500);
    assert!(!config.is_dictionary_enabled());
    assert!(config.is_statistics_enabled());
    assert!(!options.is_partitioned());
}

#[test]
fn test_writer_options_from_yaml() {
    let options: WriterOptions = serde_yaml::from_str(
        "compression: zstd\nrow_group_size: 128\npartition_cols: [year]\n",
    )
    .unwrap();

    assert_eq!(options.compression, CompressionCodec::Zstd);
    assert_eq!(options.row_group_size, Some(128));
    assert_eq!(options.partition_cols, vec!["year"]);
    assert!(options.is_partitioned());
}

// ============================================================================
// Single File Tests
// ============================================================================

#[test]
fn test_write_and_read_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.parquet");

    let rows = write_parquet(&path, &[sales_batch()], &ParquetWriterConfig::default()).unwrap();
    assert_eq!(rows, 4);

    let table = read_parquet(&path).unwrap();
    assert_eq!(table.num_rows(), 4);
    assert_eq!(table.schema(), sales_batch().schema());
    assert_eq!(ids(&table, "amount"), vec![Some(10), Some(20), Some(30), Some(40)]);
}

#[test]
fn test_typed_columns_survive_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("typed.parquet");
    let schema = TypedSchema::new(vec![
        TypedField::new(
            "ts",
            TypeDescriptor::Timestamp {
                unit: TimeUnit::Second,
                timezone: Some("UTC".to_string()),
            },
        ),
        TypedField::new("day", TypeDescriptor::Date32),
        TypedField::new("small", TypeDescriptor::Int16),
        TypedField::new("price", TypeDescriptor::decimal(10, 2)),
    ]);
    let records = vec![json!({
        "ts": "2024-05-01T12:00:00Z",
        "day": "2024-05-01",
        "small": 7,
        "price": "12.34"
    })];
    let batch = ingest_data(
        &records,
        &ColumnPlanSource::TypedSchema(schema),
        &IngestOptions::default(),
    )
    .unwrap();

    write_parquet(&path, &[batch.clone()], &ParquetWriterConfig::default()).unwrap();
    let table = read_parquet(&path).unwrap();

    let types: Vec<DataType> = table
        .schema()
        .fields()
        .iter()
        .map(|f| f.data_type().clone())
        .collect();
    assert_eq!(
        types,
        vec![
            DataType::Timestamp(TimeUnit::Nanosecond, Some("UTC".into())),
            DataType::Date32,
            DataType::Int16,
            DataType::Decimal128(10, 2),
        ]
    );
    assert_eq!(table, batch);
}

#[test]
fn test_write_concatenates_batches() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("many.parquet");
    let first = batch_from(&[json!({"id": 1})]);
    let second = batch_from(&[json!({"id": 2}), json!({"id": 3})]);

    let rows = write_parquet(&path, &[first, second], &ParquetWriterConfig::default()).unwrap();
    assert_eq!(rows, 3);
    assert_eq!(
        ids(&read_parquet(&path).unwrap(), "id"),
        vec![Some(1), Some(2), Some(3)]
    );
}

#[test]
fn test_write_rejects_mismatched_schemas() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.parquet");
    let first = batch_from(&[json!({"id": 1})]);
    let second = batch_from(&[json!({"name": "x"})]);

    let result = write_parquet(&path, &[first, second], &ParquetWriterConfig::default());
    assert!(matches!(result, Err(Error::Output { .. })));
}

#[test]
fn test_write_empty_batches_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.parquet");

    let result = write_parquet(&path, &[], &ParquetWriterConfig::default());
    assert!(matches!(result, Err(Error::Output { .. })));
    assert!(!path.exists());
}

#[test]
fn test_zero_row_batch_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("zero.parquet");
    let schema = TypedSchema::new(vec![TypedField::new("id", TypeDescriptor::Int64)]);
    let batch = ingest_data(
        &[],
        &ColumnPlanSource::TypedSchema(schema),
        &IngestOptions::default(),
    )
    .unwrap();

    write_parquet(&path, &[batch], &ParquetWriterConfig::default()).unwrap();
    let table = read_parquet(&path).unwrap();
    assert_eq!(table.num_rows(), 0);
    assert_eq!(table.schema().field(0).name(), "id");
}

#[test]
fn test_parquet_writer_rows_written() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("writer.parquet");
    let batch = batch_from(&[json!({"id": 1}), json!({"id": 2})]);

    let config = ParquetWriterConfig::default();
    let mut writer = ParquetWriter::new(&path, batch.schema().as_ref(), &config).unwrap();
    assert_eq!(writer.rows_written(), 0);

    writer.write(&batch).unwrap();
    assert_eq!(writer.rows_written(), 2);
    assert_eq!(writer.close().unwrap(), 2);
}

#[test]
fn test_read_missing_file() {
    let dir = tempdir().unwrap();
    let result = read_parquet(dir.path().join("nope.parquet"));
    assert!(matches!(result, Err(Error::FileNotFound { .. })));
}

// ============================================================================
// Dataset Tests
// ============================================================================

#[test]
fn test_dataset_layout() {
    let dir = tempdir().unwrap();
    let options = DatasetOptions::new(vec!["year".to_string(), "region".to_string()]);

    let files = write_parquet_dataset(dir.path(), &[sales_batch()], &options).unwrap();

    let mut layout: Vec<String> = files
        .iter()
        .map(|f| relative_dir(dir.path(), f))
        .collect();
    layout.sort();
    let expected = vec![
        "year=2023/region=east".to_string(),
        "year=2023/region=west".to_string(),
        format!("year=2024/region={NULL_PARTITION}"),
        "year=2024/region=east".to_string(),
    ];
    assert_eq!(layout, expected);

    for file in &files {
        assert_eq!(file.extension().unwrap(), "parquet");
        let table = read_parquet(file).unwrap();
        let schema = table.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, vec!["amount"]);
    }
}

#[test]
fn test_dataset_rows_land_in_their_partition() {
    let dir = tempdir().unwrap();
    let options = DatasetOptions::new(vec!["region".to_string()]);

    let files = write_parquet_dataset(dir.path(), &[sales_batch()], &options).unwrap();
    let east = files
        .iter()
        .find(|f| relative_dir(dir.path(), f) == "region=east")
        .unwrap();

    let table = read_parquet(east).unwrap();
    assert_eq!(ids(&table, "amount"), vec![Some(10), Some(30)]);
    assert_eq!(ids(&table, "year"), vec![Some(2023), Some(2024)]);
}

#[test]
fn test_dataset_without_partitions_writes_one_file() {
    let dir = tempdir().unwrap();
    let files =
        write_parquet_dataset(dir.path(), &[sales_batch()], &DatasetOptions::default()).unwrap();

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].parent().unwrap(), dir.path());
    assert_eq!(read_parquet(&files[0]).unwrap().num_rows(), 4);
}

#[test]
fn test_dataset_unknown_partition_column() {
    let dir = tempdir().unwrap();
    let options = DatasetOptions::new(vec!["country".to_string()]);

    let result = write_parquet_dataset(dir.path(), &[sales_batch()], &options);
    assert!(matches!(result, Err(Error::Output { .. })));
}

#[test]
fn test_dataset_cannot_partition_every_column() {
    let dir = tempdir().unwrap();
    let batch = batch_from(&[json!({"region": "east"})]);
    let options = DatasetOptions::new(vec!["region".to_string()]);

    let result = write_parquet_dataset(dir.path(), &[batch], &options);
    assert!(matches!(result, Err(Error::Output { .. })));
}

#[test]
fn test_dataset_escapes_partition_values() {
    let dir = tempdir().unwrap();
    let batch = batch_from(&[json!({"path": "a/b=c", "n": 1})]);
    let options = DatasetOptions::new(vec!["path".to_string()]);

    let files = write_parquet_dataset(dir.path(), &[batch], &options).unwrap();
    assert_eq!(relative_dir(dir.path(), &files[0]), "path=a%2Fb%3Dc");

    let table = read_parquet(&files[0]).unwrap();
    let n = table.column_by_name("n").unwrap();
    assert_eq!(n.len(), 1);
    assert!(table.column_by_name("path").is_none());
}

#[test]
fn test_dataset_empty_string_uses_null_partition() {
    let dir = tempdir().unwrap();
    let batch = batch_from(&[
        json!({"kind": "", "n": 1}),
        json!({"kind": null, "n": 2}),
        json!({"kind": "x", "n": 3}),
    ]);
    let options = DatasetOptions::new(vec!["kind".to_string()]);

    let files = write_parquet_dataset(dir.path(), &[batch], &options).unwrap();
    let layout: Vec<String> = files.iter().map(|f| relative_dir(dir.path(), f)).collect();
    assert_eq!(layout, vec![format!("kind={NULL_PARTITION}"), "kind=x".to_string()]);

    let table = read_parquet(&files[0]).unwrap();
    assert_eq!(ids(&table, "n"), vec![Some(1), Some(2)]);
}

#[test]
fn test_escape_path_segment() {
    assert_eq!(escape_path_segment("plain value"), "plain value");
    assert_eq!(escape_path_segment("50%"), "50%25");
    assert_eq!(escape_path_segment("a:b"), "a%3Ab");
    assert_eq!(escape_path_segment("tab\there"), "tab%09here");
}

#[test]
fn test_string_partition_values_read_back() {
    let dir = tempdir().unwrap();
    let batch = batch_from(&[
        json!({"kind": "x", "label": "first"}),
        json!({"kind": "x", "label": "second"}),
    ]);
    let options = DatasetOptions::new(vec!["kind".to_string()]);

    let files = write_parquet_dataset(dir.path(), &[batch], &options).unwrap();
    assert_eq!(files.len(), 1);

    let table = read_parquet(&files[0]).unwrap();
    let labels: Vec<Option<&str>> = table
        .column_by_name("label")
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap()
        .iter()
        .collect();
    assert_eq!(labels, vec![Some("first"), Some("second")]);
}
