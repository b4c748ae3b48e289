//! Catalog module
//!
//! Builds typed schemas from a warehouse's column catalog.
//!
//! # Overview
//!
//! A [`ColumnCatalog`] reports `(name, type, precision, scale,
//! datetime_precision)` rows for a table. [`schema_from_catalog`] maps each
//! reported type through a static table and drops partition columns, which
//! are virtual in the warehouse and never appear in row data.

mod engine;
mod mapping;
mod types;

pub use engine::{redact_uri, DuckDbCatalog};
pub use mapping::{convert_type, schema_from_catalog, schema_from_columns, DEFAULT_DECIMAL_PRECISION};
pub use types::{CatalogBackend, CatalogColumn, ColumnCatalog};
