//! Ingest module
//!
//! Converts row-oriented JSON records into a typed Arrow RecordBatch.
//!
//! # Overview
//!
//! Columns with a declared type are coerced value by value:
//! - **Timestamp**: parsed from strings (optional format), clamped on failure by default
//! - **Date32**: days since the Unix epoch
//! - **Float32/Float64**: explicit widths, Float32 via a checked f64 narrowing
//! - **Int16/Int32**: built as Int64 then narrowed, overflow is an error
//! - **Boolean**: booleans plus numeric 0/non-zero
//!
//! Columns without a declared type get a type inferred from their values.

mod coerce;
mod engine;
mod infer;
mod temporal;
mod types;

pub use engine::{convert, ingest, ingest_data};
pub use temporal::{
    apply_timestamp_fallback, days_since_epoch, parse_datetime, timestamp_nanos, TemporalError,
    MAX_TIMESTAMP_NANOS,
};
pub use types::{IngestOptions, IngestWarning, Ingested, TimestampFallback};
