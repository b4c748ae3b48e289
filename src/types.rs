//! Common types used throughout json2parquet
//!
//! This module contains shared type definitions, type aliases,
//! and the column type descriptors that drive conversion.

use crate::error::{Error, Result};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit, DECIMAL128_MAX_PRECISION};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// One input record. Anything other than an object behaves as a record with no fields.
pub type Record = JsonValue;

/// Source-name to output-name aliases
pub type FieldAliases = NameMapping;

// ============================================================================
// Name Mapping
// ============================================================================

/// Ordered mapping of source field names to output column names
///
/// Insertion order is kept because it decides output column order when the
/// mapping itself drives the plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameMapping(Vec<(String, String)>);

impl NameMapping {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping, replacing any earlier one for the same source name
    pub fn insert(&mut self, source: impl Into<String>, output: impl Into<String>) {
        let source = source.into();
        let output = output.into();
        if let Some(existing) = self.0.iter_mut().find(|(s, _)| *s == source) {
            existing.1 = output;
        } else {
            self.0.push((source, output));
        }
    }

    /// Builder form of [`insert`](Self::insert)
    #[must_use]
    pub fn with(mut self, source: impl Into<String>, output: impl Into<String>) -> Self {
        self.insert(source, output);
        self
    }

    /// Look up the output name for a source field
    pub fn get(&self, source: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(s, _)| s == source)
            .map(|(_, o)| o.as_str())
    }

    /// Iterate `(source, output)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(s, o)| (s.as_str(), o.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>, O: Into<String>> FromIterator<(S, O)> for NameMapping {
    fn from_iter<I: IntoIterator<Item = (S, O)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (source, output) in iter {
            mapping.insert(source, output);
        }
        mapping
    }
}

impl Serialize for NameMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (source, output) in &self.0 {
            map.serialize_entry(source, output)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for NameMapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct MappingVisitor;

        impl<'de> Visitor<'de> for MappingVisitor {
            type Value = NameMapping;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of source field names to output names")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut mapping = NameMapping::new();
                while let Some((source, output)) = access.next_entry::<String, String>()? {
                    mapping.insert(source, output);
                }
                Ok(mapping)
            }
        }

        deserializer.deserialize_map(MappingVisitor)
    }
}

// ============================================================================
// Type Descriptor
// ============================================================================

static TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^timestamp(?:\[\s*(?P<unit>s|ms|us|ns)\s*(?:,\s*tz\s*=\s*(?P<tz>[^\]]+?))?\s*\])?$")
        .expect("valid timestamp regex")
});

static DECIMAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^decimal(?:128)?\(\s*(?P<precision>\d+)\s*,\s*(?P<scale>-?\d+)\s*\)$")
        .expect("valid decimal regex")
});

/// Target storage type of a column
///
/// Textual forms: `int16`, `int32`, `int64`, `float32`, `float64`, `bool`,
/// `string`, `date32`, `timestamp[ns]`, `timestamp[ms, tz=UTC]`,
/// `decimal(10, 2)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeDescriptor {
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Boolean,
    Utf8,
    /// Days since 1970-01-01
    Date32,
    Timestamp {
        unit: TimeUnit,
        timezone: Option<String>,
    },
    Decimal {
        precision: u8,
        scale: i8,
    },
}

/// Whether `decimal(precision, scale)` fits a 128-bit decimal
pub(crate) fn decimal_in_range(precision: u8, scale: i8) -> bool {
    (1..=DECIMAL128_MAX_PRECISION).contains(&precision) && i16::from(scale) <= i16::from(precision)
}

impl TypeDescriptor {
    /// Timestamp without timezone at the given unit
    pub fn timestamp(unit: TimeUnit) -> Self {
        Self::Timestamp {
            unit,
            timezone: None,
        }
    }

    /// Decimal with the given precision and scale
    ///
    /// Unchecked; a precision outside 1..=38 is rejected when a column is built.
    pub fn decimal(precision: u8, scale: i8) -> Self {
        Self::Decimal { precision, scale }
    }

    /// Arrow type of the array this descriptor materializes into
    ///
    /// Timestamps are always materialized at nanosecond resolution.
    pub fn to_arrow(&self) -> DataType {
        match self {
            Self::Int16 => DataType::Int16,
            Self::Int32 => DataType::Int32,
            Self::Int64 => DataType::Int64,
            Self::Float32 => DataType::Float32,
            Self::Float64 => DataType::Float64,
            Self::Boolean => DataType::Boolean,
            Self::Utf8 => DataType::Utf8,
            Self::Date32 => DataType::Date32,
            Self::Timestamp { timezone, .. } => DataType::Timestamp(
                TimeUnit::Nanosecond,
                timezone.as_deref().map(Arc::from),
            ),
            Self::Decimal { precision, scale } => DataType::Decimal128(*precision, *scale),
        }
    }

    /// Descriptor for an Arrow type, if one exists
    pub fn from_arrow(data_type: &DataType) -> Option<Self> {
        Some(match data_type {
            DataType::Int16 => Self::Int16,
            DataType::Int32 => Self::Int32,
            DataType::Int64 => Self::Int64,
            DataType::Float32 => Self::Float32,
            DataType::Float64 => Self::Float64,
            DataType::Boolean => Self::Boolean,
            DataType::Utf8 | DataType::LargeUtf8 => Self::Utf8,
            DataType::Date32 => Self::Date32,
            DataType::Timestamp(unit, tz) => Self::Timestamp {
                unit: *unit,
                timezone: tz.as_deref().map(ToString::to_string),
            },
            DataType::Decimal128(precision, scale) if decimal_in_range(*precision, *scale) => {
                Self::Decimal {
                    precision: *precision,
                    scale: *scale,
                }
            }
            _ => return None,
        })
    }
}

fn unit_suffix(unit: TimeUnit) -> &'static str {
    match unit {
        TimeUnit::Second => "s",
        TimeUnit::Millisecond => "ms",
        TimeUnit::Microsecond => "us",
        TimeUnit::Nanosecond => "ns",
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int16 => write!(f, "int16"),
            Self::Int32 => write!(f, "int32"),
            Self::Int64 => write!(f, "int64"),
            Self::Float32 => write!(f, "float32"),
            Self::Float64 => write!(f, "float64"),
            Self::Boolean => write!(f, "bool"),
            Self::Utf8 => write!(f, "string"),
            Self::Date32 => write!(f, "date32"),
            Self::Timestamp {
                unit,
                timezone: None,
            } => write!(f, "timestamp[{}]", unit_suffix(*unit)),
            Self::Timestamp {
                unit,
                timezone: Some(tz),
            } => write!(f, "timestamp[{}, tz={tz}]", unit_suffix(*unit)),
            Self::Decimal { precision, scale } => write!(f, "decimal({precision}, {scale})"),
        }
    }
}

impl FromStr for TypeDescriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        let invalid = || Error::InvalidType {
            value: s.to_string(),
        };

        let simple = match normalized.as_str() {
            "int16" | "smallint" => Some(Self::Int16),
            "int32" | "int" | "integer" => Some(Self::Int32),
            "int64" | "bigint" | "long" => Some(Self::Int64),
            "float32" | "float" | "real" => Some(Self::Float32),
            "float64" | "double" => Some(Self::Float64),
            "bool" | "boolean" => Some(Self::Boolean),
            "string" | "str" | "utf8" => Some(Self::Utf8),
            "date32" | "date" => Some(Self::Date32),
            _ => None,
        };
        if let Some(descriptor) = simple {
            return Ok(descriptor);
        }

        if let Some(caps) = TIMESTAMP_RE.captures(&normalized) {
            let unit = match caps.name("unit").map(|m| m.as_str()) {
                Some("s") => TimeUnit::Second,
                Some("ms") => TimeUnit::Millisecond,
                Some("us") => TimeUnit::Microsecond,
                _ => TimeUnit::Nanosecond,
            };
            // Timezone names are case sensitive, recover them from the raw input
            let timezone = caps.name("tz").map(|m| {
                let raw = s.trim();
                raw.get(m.start()..m.end())
                    .unwrap_or(m.as_str())
                    .trim()
                    .to_string()
            });
            return Ok(Self::Timestamp { unit, timezone });
        }

        if let Some(caps) = DECIMAL_RE.captures(&normalized) {
            let precision: u8 = caps["precision"].parse().map_err(|_| invalid())?;
            let scale: i8 = caps["scale"].parse().map_err(|_| invalid())?;
            if !decimal_in_range(precision, scale) {
                return Err(invalid());
            }
            return Ok(Self::Decimal { precision, scale });
        }

        Err(invalid())
    }
}

impl TryFrom<String> for TypeDescriptor {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TypeDescriptor> for String {
    fn from(descriptor: TypeDescriptor) -> Self {
        descriptor.to_string()
    }
}

// ============================================================================
// Typed Schema
// ============================================================================

/// A declared column: source field name plus target type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedField {
    pub name: String,

    #[serde(rename = "type")]
    pub data_type: TypeDescriptor,
}

impl TypedField {
    pub fn new(name: impl Into<String>, data_type: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Fully-typed schema, fields in output order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedSchema {
    pub fields: Vec<TypedField>,
}

impl TypedSchema {
    pub fn new(fields: Vec<TypedField>) -> Self {
        Self { fields }
    }

    /// Append a field
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, data_type: TypeDescriptor) -> Self {
        self.fields.push(TypedField::new(name, data_type));
        self
    }

    /// Field names in declared order
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Arrow schema with every field nullable
    pub fn to_arrow(&self) -> Schema {
        Schema::new(
            self.fields
                .iter()
                .map(|f| Field::new(&f.name, f.data_type.to_arrow(), true))
                .collect::<Vec<_>>(),
        )
    }

    /// Build from an Arrow schema, failing on types with no descriptor
    pub fn from_arrow(schema: &Schema) -> Result<Self> {
        let fields = schema
            .fields()
            .iter()
            .map(|field| {
                TypeDescriptor::from_arrow(field.data_type())
                    .map(|t| TypedField::new(field.name().clone(), t))
                    .ok_or_else(|| Error::InvalidType {
                        value: field.data_type().to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { fields })
    }
}
