//! Warehouse type names to type descriptors

use super::types::{CatalogColumn, ColumnCatalog};
use crate::error::{Error, Result};
use crate::types::{TypeDescriptor, TypedField, TypedSchema};
use arrow::datatypes::TimeUnit;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Default decimal precision when the catalog reports none
pub const DEFAULT_DECIMAL_PRECISION: u8 = 38;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceType {
    Int16,
    Int32,
    Int64,
    Boolean,
    Float32,
    Float64,
    Decimal,
    Utf8,
    Date32,
    Timestamp,
}

static SOURCE_TYPES: Lazy<HashMap<&'static str, SourceType>> = Lazy::new(|| {
    use SourceType::*;
    HashMap::from([
        ("SMALLINT", Int16),
        ("INT2", Int16),
        ("INTEGER", Int32),
        ("INT", Int32),
        ("INT4", Int32),
        ("BIGINT", Int64),
        ("INT8", Int64),
        ("BOOLEAN", Boolean),
        ("BOOL", Boolean),
        ("REAL", Float32),
        ("FLOAT4", Float32),
        ("DOUBLE PRECISION", Float64),
        ("FLOAT8", Float64),
        ("FLOAT", Float64),
        ("DOUBLE", Float64),
        ("DECIMAL", Decimal),
        ("NUMERIC", Decimal),
        ("CHAR", Utf8),
        ("CHARACTER", Utf8),
        ("NCHAR", Utf8),
        ("BPCHAR", Utf8),
        ("VARCHAR", Utf8),
        ("CHARACTER VARYING", Utf8),
        ("NVARCHAR", Utf8),
        ("TEXT", Utf8),
        ("DATE", Date32),
        ("TIMESTAMP", Timestamp),
        ("TIMESTAMP WITHOUT TIME ZONE", Timestamp),
        ("TIMESTAMPTZ", Timestamp),
        ("TIMESTAMP WITH TIME ZONE", Timestamp),
    ])
});

// `character varying(256)`, `numeric(18,4)`
static SIZE_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<type>[^()]+?)\s*\(\s*\d+\s*(?:,\s*\d+\s*)?\)$")
        .expect("valid size regex")
});

/// Normalize a catalog type name for lookup
fn base_type_name(data_type: &str) -> String {
    let trimmed = data_type.trim();
    let base = SIZE_SUFFIX_RE
        .captures(trimmed)
        .and_then(|caps| caps.name("type"))
        .map_or(trimmed, |m| m.as_str());
    base.to_uppercase()
}

/// Map one catalog column to its target type
pub fn convert_type(column: &CatalogColumn) -> Result<TypeDescriptor> {
    let base = base_type_name(&column.data_type);
    let source = SOURCE_TYPES
        .get(base.as_str())
        .ok_or_else(|| Error::UnknownSourceType {
            column: column.name.clone(),
            source_type: column.data_type.clone(),
        })?;

    let descriptor = match source {
        SourceType::Int16 => TypeDescriptor::Int16,
        SourceType::Int32 => TypeDescriptor::Int32,
        SourceType::Int64 => TypeDescriptor::Int64,
        SourceType::Boolean => TypeDescriptor::Boolean,
        SourceType::Float32 => TypeDescriptor::Float32,
        SourceType::Float64 => TypeDescriptor::Float64,
        SourceType::Utf8 => TypeDescriptor::Utf8,
        SourceType::Date32 => TypeDescriptor::Date32,
        // Zone information is not available from the catalog
        SourceType::Timestamp => TypeDescriptor::timestamp(TimeUnit::Nanosecond),
        SourceType::Decimal => {
            let precision = column
                .numeric_precision
                .unwrap_or(i64::from(DEFAULT_DECIMAL_PRECISION));
            let scale = column.numeric_scale.unwrap_or(0);
            if !(1..=i64::from(DEFAULT_DECIMAL_PRECISION)).contains(&precision)
                || !(0..=precision).contains(&scale)
            {
                return Err(Error::UnknownSourceType {
                    column: column.name.clone(),
                    source_type: format!("{}({precision},{scale})", column.data_type),
                });
            }
            // Both bounded by 38 above
            TypeDescriptor::decimal(precision as u8, scale as i8)
        }
    };

    Ok(descriptor)
}

/// Build a typed schema from catalog columns, skipping partition columns
pub fn schema_from_columns(
    columns: &[CatalogColumn],
    partition_columns: &[String],
) -> Result<TypedSchema> {
    let fields = columns
        .iter()
        .filter(|column| !partition_columns.contains(&column.name))
        .map(|column| Ok(TypedField::new(column.name.clone(), convert_type(column)?)))
        .collect::<Result<Vec<_>>>()?;
    Ok(TypedSchema::new(fields))
}

/// Query a catalog for a table and build its typed schema
///
/// Partition columns are virtual in the warehouse and never present in row
/// data, so they are left out of the result.
pub fn schema_from_catalog(
    catalog: &dyn ColumnCatalog,
    schema: &str,
    table: &str,
    partition_columns: &[String],
) -> Result<TypedSchema> {
    let columns = catalog.fetch_columns(schema, table)?;
    if columns.is_empty() {
        return Err(Error::schema(format!(
            "No columns found for table '{schema}.{table}'"
        )));
    }

    let typed = schema_from_columns(&columns, partition_columns)?;
    tracing::debug!(
        schema,
        table,
        columns = typed.fields.len(),
        excluded = columns.len() - typed.fields.len(),
        "Built schema from catalog"
    );
    Ok(typed)
}
