//! Column plan resolution tests

use super::*;
use crate::error::Error;
use crate::types::{NameMapping, TypeDescriptor, TypedSchema};
use pretty_assertions::assert_eq;
use serde_json::json;

fn sample_records() -> Vec<serde_json::Value> {
    vec![
        json!({"foo": 1, "bar": 2}),
        json!({"foo": 10, "bar": 20}),
        json!({"foo": 100, "bar": 200, "baz": 300}),
    ]
}

#[test]
fn test_resolve_without_schema_sorts_union_of_keys() {
    let plan = resolve(&sample_records(), &ColumnPlanSource::None, None).unwrap();
    assert_eq!(plan.output_names(), vec!["bar", "baz", "foo"]);
    assert!(plan.entries().iter().all(|e| e.target_type.is_none()));
    assert!(plan
        .entries()
        .iter()
        .all(|e| e.source_field == e.output_name));
}

#[test]
fn test_resolve_without_schema_is_independent_of_record_order() {
    let mut reversed = sample_records();
    reversed.reverse();
    let a = resolve(&sample_records(), &ColumnPlanSource::None, None).unwrap();
    let b = resolve(&reversed, &ColumnPlanSource::None, None).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_resolve_empty_records() {
    let plan = resolve(&[], &ColumnPlanSource::None, None).unwrap();
    assert!(plan.is_empty());
}

#[test]
fn test_resolve_ignores_non_object_records() {
    let records = vec![json!({"a": 1}), json!(42), json!(null)];
    let plan = resolve(&records, &ColumnPlanSource::None, None).unwrap();
    assert_eq!(plan.output_names(), vec!["a"]);
}

#[test]
fn test_resolve_name_list_keeps_order() {
    let source = ColumnPlanSource::NameList(vec!["foo".into(), "bar".into()]);
    let plan = resolve(&sample_records(), &source, None).unwrap();
    assert_eq!(plan.output_names(), vec!["foo", "bar"]);
}

#[test]
fn test_resolve_name_list_with_aliases_uses_aliases() {
    let source = ColumnPlanSource::NameList(vec!["foo".into(), "bar".into()]);
    let aliases = NameMapping::new().with("bar", "renamed_bar");
    let plan = resolve(&sample_records(), &source, Some(&aliases)).unwrap();

    assert_eq!(plan.len(), 1);
    assert_eq!(plan.entries()[0].source_field, "bar");
    assert_eq!(plan.entries()[0].output_name, "renamed_bar");
}

#[test]
fn test_resolve_name_map_ignores_aliases() {
    let mapping = NameMapping::new().with("foo", "f").with("bar", "b");
    let aliases = NameMapping::new().with("foo", "ignored");
    let plan = resolve(
        &sample_records(),
        &ColumnPlanSource::NameMap(mapping),
        Some(&aliases),
    )
    .unwrap();

    assert_eq!(plan.output_names(), vec!["f", "b"]);
    assert_eq!(plan.entries()[0].source_field, "foo");
    assert!(plan.entries()[0].target_type.is_none());
}

#[test]
fn test_resolve_typed_schema_with_aliases() {
    let schema = TypedSchema::default()
        .with_field("foo", TypeDescriptor::Int64)
        .with_field("bar", TypeDescriptor::Int64);
    let aliases = NameMapping::new().with("foo", "corrected_foo");
    let plan = resolve(&sample_records(), &schema.into(), Some(&aliases)).unwrap();

    assert_eq!(plan.output_names(), vec!["corrected_foo", "bar"]);
    assert_eq!(plan.entries()[0].source_field, "foo");
    assert_eq!(plan.entries()[0].target_type, Some(TypeDescriptor::Int64));
}

#[test]
fn test_resolve_rejects_duplicate_output_names() {
    let schema = TypedSchema::default()
        .with_field("foo", TypeDescriptor::Int64)
        .with_field("bar", TypeDescriptor::Int64);
    let aliases = NameMapping::new().with("foo", "bar");
    let err = resolve(&sample_records(), &schema.into(), Some(&aliases)).unwrap_err();
    assert!(matches!(err, Error::SchemaResolution { .. }));
}

#[test]
fn test_source_from_json_shapes() {
    assert_eq!(
        ColumnPlanSource::from_json(&json!(null)).unwrap(),
        ColumnPlanSource::None
    );
    assert_eq!(
        ColumnPlanSource::from_json(&json!(["a", "b"])).unwrap(),
        ColumnPlanSource::NameList(vec!["a".into(), "b".into()])
    );
    assert_eq!(
        ColumnPlanSource::from_json(&json!({"b": "x", "a": "y"})).unwrap(),
        ColumnPlanSource::NameMap(NameMapping::new().with("b", "x").with("a", "y"))
    );

    let typed = ColumnPlanSource::from_json(&json!({
        "fields": [{"name": "ts", "type": "timestamp[ns]"}, {"name": "n", "type": "int32"}]
    }))
    .unwrap();
    let ColumnPlanSource::TypedSchema(schema) = typed else {
        panic!("Expected typed schema");
    };
    assert_eq!(schema.names(), vec!["ts", "n"]);
}

#[test]
fn test_source_from_json_rejects_unknown_shapes() {
    for value in [json!(42), json!("foo"), json!([1, 2]), json!({"a": 1})] {
        let err = ColumnPlanSource::from_json(&value).unwrap_err();
        assert!(
            matches!(err, Error::SchemaResolution { .. }),
            "unexpected error for {value}: {err}"
        );
    }
}

#[test]
fn test_source_from_json_rejects_bad_field_type() {
    let err = ColumnPlanSource::from_json(&json!({
        "fields": [{"name": "x", "type": "geometry"}]
    }))
    .unwrap_err();
    assert!(matches!(err, Error::SchemaResolution { .. }));
}
