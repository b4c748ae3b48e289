//! Tests for decoder module

use super::*;
use crate::error::Error;
use crate::ingest::IngestOptions;
use crate::schema::ColumnPlanSource;
use crate::types::{TypeDescriptor, TypedSchema};
use std::io::Write;

// ============================================================================
// JSONL Decoder Tests
// ============================================================================

#[test]
fn test_jsonl_decoder() {
    let body = "{\"foo\": 1, \"bar\": 2}\n{\"foo\": 10, \"bar\": 20}\n";
    let records = JsonlDecoder::new().decode(body).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["foo"], 10);
}

#[test]
fn test_jsonl_decoder_skips_blank_lines() {
    let body = "{\"a\": 1}\n\n   \n{\"a\": 2}\n\n";
    let records = JsonlDecoder::new().decode(body).unwrap();
    assert_eq!(records.len(), 2);
}

#[test]
fn test_jsonl_decoder_malformed_line() {
    let body = "{\"a\": 1}\n{\"a\": \n{\"a\": 3}";
    let err = JsonlDecoder::new().decode(body).unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
    assert!(err.to_string().contains("line 2"));
}

#[test]
fn test_jsonl_decoder_empty_body() {
    assert!(JsonlDecoder::new().decode("").unwrap().is_empty());
}

// ============================================================================
// JSON Decoder Tests
// ============================================================================

#[test]
fn test_json_decoder_array() {
    let records = JsonDecoder::new()
        .decode(r#"[{"a": 1}, {"a": 2}]"#)
        .unwrap();
    assert_eq!(records.len(), 2);
}

#[test]
fn test_json_decoder_single_object() {
    let records = JsonDecoder::new().decode(r#"{"a": 1}"#).unwrap();
    assert_eq!(records.len(), 1);
}

// ============================================================================
// Loader Tests
// ============================================================================

#[test]
fn test_load_json_with_schema() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{{\"foo\": 1, \"bar\": 2}}").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "{{\"foo\": 10, \"bar\": 20}}").unwrap();

    let schema = TypedSchema::default()
        .with_field("foo", TypeDescriptor::Int32)
        .with_field("bar", TypeDescriptor::Int64);
    let batch = load_json(file.path(), &schema.into(), &IngestOptions::default()).unwrap();

    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.num_columns(), 2);
    assert_eq!(
        batch.schema().field(0).data_type(),
        &arrow::datatypes::DataType::Int32
    );
}

#[test]
fn test_read_records_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_records(dir.path().join("nope.jsonl"), DecoderFormat::Jsonl).unwrap_err();
    assert!(matches!(err, Error::FileNotFound { .. }));
}

#[test]
fn test_load_json_without_schema() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{{\"b\": 1}}").unwrap();
    writeln!(file, "{{\"a\": \"x\"}}").unwrap();

    let batch = load_json(
        file.path(),
        &ColumnPlanSource::None,
        &IngestOptions::default(),
    )
    .unwrap();
    let names: Vec<_> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    assert_eq!(names, vec!["a", "b"]);
}
