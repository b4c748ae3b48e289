//! Array construction for columns without a declared type
//!
//! The column type is inferred from the values, then the array is built
//! value by value. Mixed value kinds that have no common numeric type fall
//! back to strings holding the JSON text.

use crate::error::{Error, Result};
use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int64Array, ListArray, NullArray, StringArray,
    StructArray,
};
use arrow::buffer::{NullBuffer, OffsetBuffer};
use arrow::datatypes::{DataType, Field, Fields};
use serde_json::Value;
use std::sync::Arc;

/// Infer a type for the column and build its array
pub fn build_inferred(values: &[Option<&Value>]) -> Result<ArrayRef> {
    let data_type = infer_column_type(values);
    build_array(values, &data_type)
}

/// Common type of every non-null value in a column
pub fn infer_column_type(values: &[Option<&Value>]) -> DataType {
    values
        .iter()
        .flatten()
        .map(|v| infer_type(v))
        .fold(DataType::Null, |acc, t| merge_types(&acc, &t))
}

/// Infer Arrow DataType from a JSON value
fn infer_type(value: &Value) -> DataType {
    match value {
        Value::Null => DataType::Null,
        Value::Bool(_) => DataType::Boolean,
        Value::Number(n) => {
            if n.is_i64() {
                DataType::Int64
            } else {
                DataType::Float64
            }
        }
        Value::String(_) => DataType::Utf8,
        Value::Array(arr) => {
            let element_type = arr
                .iter()
                .map(infer_type)
                .fold(DataType::Null, |acc, t| merge_types(&acc, &t));
            DataType::List(Arc::new(Field::new("item", element_type, true)))
        }
        Value::Object(obj) => {
            let fields: Vec<Field> = obj
                .iter()
                .map(|(k, v)| Field::new(k, infer_type(v), true))
                .collect();
            DataType::Struct(Fields::from(fields))
        }
    }
}

/// Merge two data types into a compatible type
fn merge_types(type1: &DataType, type2: &DataType) -> DataType {
    match (type1, type2) {
        (a, b) if a == b => a.clone(),

        (DataType::Null, other) | (other, DataType::Null) => other.clone(),

        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            DataType::Float64
        }

        (DataType::List(a), DataType::List(b)) => DataType::List(Arc::new(Field::new(
            "item",
            merge_types(a.data_type(), b.data_type()),
            true,
        ))),

        (DataType::Struct(a), DataType::Struct(b)) => DataType::Struct(merge_struct_fields(a, b)),

        // Different types -> fall back to String (most flexible)
        _ => DataType::Utf8,
    }
}

/// Union of two struct field sets, first-seen order, shared fields merged
fn merge_struct_fields(a: &Fields, b: &Fields) -> Fields {
    let mut merged: Vec<Field> = a.iter().map(|f| f.as_ref().clone()).collect();
    for field in b {
        if let Some(existing) = merged.iter_mut().find(|f| f.name() == field.name()) {
            let data_type = merge_types(existing.data_type(), field.data_type());
            *existing = Field::new(field.name(), data_type, true);
        } else {
            merged.push(field.as_ref().clone());
        }
    }
    Fields::from(merged)
}

/// Build an Arrow array from JSON values
fn build_array(values: &[Option<&Value>], data_type: &DataType) -> Result<ArrayRef> {
    match data_type {
        DataType::Null => Ok(Arc::new(NullArray::new(values.len()))),

        DataType::Boolean => {
            let arr: BooleanArray = values.iter().map(|v| v.and_then(Value::as_bool)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Int64 => {
            let arr: Int64Array = values.iter().map(|v| v.and_then(Value::as_i64)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Float64 => {
            let arr: Float64Array = values.iter().map(|v| v.and_then(Value::as_f64)).collect();
            Ok(Arc::new(arr))
        }

        DataType::List(field) => build_list_array(values, field),

        DataType::Struct(fields) => build_struct_array(values, fields),

        _ => {
            let arr: StringArray = values
                .iter()
                .map(|v| match v {
                    None | Some(Value::Null) => None,
                    Some(Value::String(s)) => Some(s.clone()),
                    Some(other) => Some(other.to_string()),
                })
                .collect();
            Ok(Arc::new(arr))
        }
    }
}

fn validity(values: &[Option<&Value>], is_valid: impl Fn(&Value) -> bool) -> NullBuffer {
    values
        .iter()
        .map(|v| v.is_some_and(&is_valid))
        .collect::<Vec<bool>>()
        .into()
}

/// Build a list array from JSON arrays
fn build_list_array(values: &[Option<&Value>], field: &Arc<Field>) -> Result<ArrayRef> {
    let mut all_items: Vec<Option<&Value>> = Vec::new();
    let mut offsets: Vec<i32> = vec![0];

    for value in values {
        if let Some(Value::Array(arr)) = value {
            all_items.extend(arr.iter().map(Some));
        }
        let offset = i32::try_from(all_items.len())
            .map_err(|_| Error::output("List column too large for i32 offsets"))?;
        offsets.push(offset);
    }

    let items_array = build_array(&all_items, field.data_type())?;
    let offset_buffer = OffsetBuffer::new(offsets.into());
    let nulls = validity(values, Value::is_array);

    let list_array = ListArray::try_new(Arc::clone(field), offset_buffer, items_array, Some(nulls))?;
    Ok(Arc::new(list_array))
}

/// Build a struct array from JSON objects
fn build_struct_array(values: &[Option<&Value>], fields: &Fields) -> Result<ArrayRef> {
    let mut child_arrays: Vec<ArrayRef> = Vec::with_capacity(fields.len());

    for field in fields {
        let child_values: Vec<Option<&Value>> = values
            .iter()
            .map(|v| v.and_then(|v| v.as_object()).and_then(|obj| obj.get(field.name())))
            .collect();

        child_arrays.push(build_array(&child_values, field.data_type())?);
    }

    let nulls = validity(values, Value::is_object);
    if fields.is_empty() {
        return Ok(Arc::new(StructArray::new_empty_fields(values.len(), Some(nulls))));
    }
    let struct_array = StructArray::try_new(fields.clone(), child_arrays, Some(nulls))?;
    Ok(Arc::new(struct_array))
}
