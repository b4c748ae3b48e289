//! Catalog types

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Warehouse flavour queried for column metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CatalogBackend {
    /// Amazon Redshift, including Spectrum tables (`svv_columns`)
    Redshift,
    /// PostgreSQL (`information_schema.columns`)
    Postgres,
    /// DuckDB database file, or `:memory:`
    Duckdb,
}

impl fmt::Display for CatalogBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Redshift => "redshift",
            Self::Postgres => "postgres",
            Self::Duckdb => "duckdb",
        };
        f.write_str(name)
    }
}

impl FromStr for CatalogBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "redshift" => Ok(Self::Redshift),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "duckdb" => Ok(Self::Duckdb),
            other => Err(Error::config(format!("Unknown catalog backend '{other}'"))),
        }
    }
}

/// One row of column metadata as reported by a catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogColumn {
    pub name: String,
    pub data_type: String,
    #[serde(default)]
    pub numeric_precision: Option<i64>,
    #[serde(default)]
    pub numeric_scale: Option<i64>,
    #[serde(default)]
    pub datetime_precision: Option<i64>,
}

impl CatalogColumn {
    /// Column with a type name and no numeric metadata
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            numeric_precision: None,
            numeric_scale: None,
            datetime_precision: None,
        }
    }

    #[must_use]
    pub fn with_numeric(mut self, precision: i64, scale: i64) -> Self {
        self.numeric_precision = Some(precision);
        self.numeric_scale = Some(scale);
        self
    }
}

/// Source of column metadata for a table
pub trait ColumnCatalog {
    /// Columns of `schema.table`, ordered by column name
    fn fetch_columns(&self, schema: &str, table: &str) -> Result<Vec<CatalogColumn>>;
}
