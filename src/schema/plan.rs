//! Column plan resolution
//!
//! Turns whatever schema information the caller has into an ordered list of
//! `(source field, output name, target type)` entries.

use crate::error::{Error, Result};
use crate::types::{FieldAliases, NameMapping, Record, TypeDescriptor, TypedSchema};
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};

/// The shape of schema information supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ColumnPlanSource {
    /// Discover columns from the records
    #[default]
    None,
    /// Plain column names, used as both source and output names
    NameList(Vec<String>),
    /// Source name to output name, in output order
    NameMap(NameMapping),
    /// Declared fields with target types
    TypedSchema(TypedSchema),
}

impl ColumnPlanSource {
    /// Build a plan source from a configuration value
    ///
    /// Accepted shapes: `null`, an array of strings, an object with a `fields`
    /// array of `{name, type}`, or an object of string to string.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::None),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str().map(ToString::to_string).ok_or_else(|| {
                        Error::schema(format!("column list entries must be strings, got {item}"))
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(Self::NameList),
            Value::Object(obj) if obj.get("fields").is_some_and(Value::is_array) => {
                let schema: TypedSchema = serde_json::from_value(value.clone())
                    .map_err(|e| Error::schema(format!("invalid typed schema: {e}")))?;
                Ok(Self::TypedSchema(schema))
            }
            Value::Object(obj) => obj
                .iter()
                .map(|(source, output)| {
                    output
                        .as_str()
                        .map(|o| (source.clone(), o.to_string()))
                        .ok_or_else(|| {
                            Error::schema(format!(
                                "name mapping for '{source}' must be a string, got {output}"
                            ))
                        })
                })
                .collect::<Result<NameMapping>>()
                .map(Self::NameMap),
            other => Err(Error::schema(format!(
                "unrecognized schema shape: {other}"
            ))),
        }
    }

    /// Short label for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::NameList(_) => "name_list",
            Self::NameMap(_) => "name_map",
            Self::TypedSchema(_) => "typed_schema",
        }
    }
}

impl From<TypedSchema> for ColumnPlanSource {
    fn from(schema: TypedSchema) -> Self {
        Self::TypedSchema(schema)
    }
}

impl From<Vec<String>> for ColumnPlanSource {
    fn from(names: Vec<String>) -> Self {
        Self::NameList(names)
    }
}

impl From<NameMapping> for ColumnPlanSource {
    fn from(mapping: NameMapping) -> Self {
        Self::NameMap(mapping)
    }
}

/// One output column and where its values come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPlanEntry {
    /// Field read from each record
    pub source_field: String,
    /// Column name in the output batch
    pub output_name: String,
    /// Declared type, or `None` to infer from the values
    pub target_type: Option<TypeDescriptor>,
}

impl ColumnPlanEntry {
    /// Entry whose output name equals its source name
    pub fn untyped(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            source_field: name.clone(),
            output_name: name,
            target_type: None,
        }
    }
}

/// Ordered, immutable list of column plan entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnPlan {
    entries: Vec<ColumnPlanEntry>,
}

impl ColumnPlan {
    /// Build a plan, rejecting duplicate output names
    pub fn new(entries: Vec<ColumnPlanEntry>) -> Result<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.output_name.as_str()) {
                return Err(Error::schema(format!(
                    "duplicate output column '{}'",
                    entry.output_name
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ColumnPlanEntry] {
        &self.entries
    }

    /// Output names in column order
    pub fn output_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.output_name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve the column plan for a set of records
///
/// Aliases only apply to typed schemas and name lists; a name map carries its
/// own output names. A name list combined with aliases is replaced by the
/// aliases altogether.
pub fn resolve(
    records: &[Record],
    source: &ColumnPlanSource,
    field_aliases: Option<&FieldAliases>,
) -> Result<ColumnPlan> {
    let entries = match (source, field_aliases) {
        (ColumnPlanSource::NameList(_), Some(aliases)) => from_name_map(aliases),
        (ColumnPlanSource::NameMap(mapping), _) => from_name_map(mapping),
        (ColumnPlanSource::NameList(names), None) => {
            names.iter().map(ColumnPlanEntry::untyped).collect()
        }
        (ColumnPlanSource::TypedSchema(schema), aliases) => schema
            .fields
            .iter()
            .map(|field| ColumnPlanEntry {
                source_field: field.name.clone(),
                output_name: aliases
                    .and_then(|a| a.get(&field.name))
                    .unwrap_or(&field.name)
                    .to_string(),
                target_type: Some(field.data_type.clone()),
            })
            .collect(),
        (ColumnPlanSource::None, _) => discover_columns(records)
            .into_iter()
            .map(ColumnPlanEntry::untyped)
            .collect(),
    };

    let plan = ColumnPlan::new(entries)?;
    tracing::debug!(
        source = source.kind(),
        columns = ?plan.output_names(),
        "Resolved column plan"
    );
    Ok(plan)
}

fn from_name_map(mapping: &NameMapping) -> Vec<ColumnPlanEntry> {
    mapping
        .iter()
        .map(|(source, output)| ColumnPlanEntry {
            source_field: source.to_string(),
            output_name: output.to_string(),
            target_type: None,
        })
        .collect()
}

/// Union of the keys of every record, sorted ascending
pub fn discover_columns(records: &[Record]) -> Vec<String> {
    let mut names: BTreeSet<&str> = BTreeSet::new();
    for record in records {
        if let Value::Object(obj) = record {
            names.extend(obj.keys().map(String::as_str));
        }
    }
    names.into_iter().map(ToString::to_string).collect()
}
