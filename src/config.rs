//! Conversion configuration
//!
//! A `ConvertConfig` describes one conversion in YAML (or JSON, which YAML
//! accepts): how to resolve columns, how to coerce values and how to write
//! the output.
//!
//! ```yaml
//! schema:
//!   fields:
//!     - { name: id, type: int64 }
//!     - { name: created_at, type: "timestamp[ms, tz=UTC]" }
//! field_aliases:
//!   id: user_id
//! date_format: "%Y-%m-%d %H:%M:%S"
//! timestamp_fallback: clamp
//! output:
//!   compression: zstd
//!   partition_cols: [region]
//! ```

use crate::catalog::CatalogBackend;
use crate::decode::DecoderFormat;
use crate::error::{Error, Result};
use crate::ingest::{IngestOptions, TimestampFallback};
use crate::output::WriterOptions;
use crate::schema::ColumnPlanSource;
use crate::types::{FieldAliases, JsonValue};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete conversion configuration loaded from YAML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Column source: null, a name list, a name map or `{fields: [...]}`
    #[serde(default)]
    pub schema: JsonValue,

    /// Output names for typed-schema and name-list sources
    #[serde(default)]
    pub field_aliases: Option<FieldAliases>,

    /// `strftime`-style timestamp format
    #[serde(default)]
    pub date_format: Option<String>,

    /// Policy for timestamps that cannot be converted
    #[serde(default)]
    pub timestamp_fallback: TimestampFallback,

    /// Input file layout
    #[serde(default)]
    pub format: DecoderFormat,

    /// Look the typed schema up in a warehouse catalog instead
    #[serde(default)]
    pub catalog: Option<CatalogSource>,

    /// Parquet writer options
    #[serde(default)]
    pub output: WriterOptions,
}

/// Warehouse table whose column catalog supplies the schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSource {
    pub backend: CatalogBackend,
    /// Connection URI or database file path
    pub uri: String,
    pub schema: String,
    pub table: String,
    /// Virtual columns excluded from the schema
    #[serde(default)]
    pub partition_columns: Vec<String>,
}

impl ConvertConfig {
    /// Load a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            }
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a config from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse config YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that serde cannot
    pub fn validate(&self) -> Result<()> {
        self.column_source()?;

        if self.catalog.is_some() && !self.schema.is_null() {
            return Err(Error::config(
                "Config cannot set both 'schema' and 'catalog'",
            ));
        }
        if self.output.row_group_size == Some(0) {
            return Err(Error::config("output.row_group_size must be positive"));
        }
        if let Some(name) = self.output.partition_cols.iter().find(|c| c.is_empty()) {
            return Err(Error::config(format!(
                "Invalid partition column name '{name}'"
            )));
        }
        if let Some(format) = &self.date_format {
            if format.trim().is_empty() {
                return Err(Error::config("date_format cannot be empty"));
            }
        }

        Ok(())
    }

    /// Column source described by `schema`
    pub fn column_source(&self) -> Result<ColumnPlanSource> {
        ColumnPlanSource::from_json(&self.schema)
    }

    /// Ingest options described by this config
    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            date_format: self.date_format.clone(),
            field_aliases: self.field_aliases.clone(),
            timestamp_fallback: self.timestamp_fallback,
        }
    }
}
