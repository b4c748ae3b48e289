//! Ingest types
//!
//! Options, warnings and results of a conversion.

use crate::types::FieldAliases;
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What to do with a timestamp that cannot be parsed or represented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFallback {
    /// Substitute the maximum representable timestamp and record a warning
    #[default]
    Clamp,
    /// Fail the conversion
    Reject,
}

/// Options for converting records into a batch
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// `strftime`-style format for timestamp columns; ISO-8601 when unset
    pub date_format: Option<String>,
    /// Output names for typed-schema and name-list sources
    pub field_aliases: Option<FieldAliases>,
    /// Policy for unparsable or out-of-range timestamps
    pub timestamp_fallback: TimestampFallback,
}

impl IngestOptions {
    /// Create options with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timestamp format
    #[must_use]
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    /// Set field aliases
    #[must_use]
    pub fn with_field_aliases(mut self, aliases: FieldAliases) -> Self {
        self.field_aliases = Some(aliases);
        self
    }

    /// Set the timestamp fallback policy
    #[must_use]
    pub fn with_timestamp_fallback(mut self, fallback: TimestampFallback) -> Self {
        self.timestamp_fallback = fallback;
        self
    }
}

/// A value that was replaced rather than converted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestWarning {
    /// Output column name
    pub column: String,
    /// Row index in the input
    pub row: usize,
    /// Original value, as JSON text
    pub value: String,
    /// Why the value was replaced
    pub message: String,
}

impl fmt::Display for IngestWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "column '{}' row {}: {} ({})",
            self.column, self.row, self.message, self.value
        )
    }
}

/// A converted batch and the warnings raised while building it
#[derive(Debug, Clone)]
pub struct Ingested {
    pub batch: RecordBatch,
    pub warnings: Vec<IngestWarning>,
}

impl Ingested {
    /// Discard warnings and keep the batch
    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }
}
