//! Configuration to document mapping
//!
//! Walks the caller's configuration and the resource schema in lockstep and
//! produces a [`DocumentTree`]. Per field:
//!
//! - unknown or not provided: absent
//! - explicit null: null, if the field is nullable
//! - anything else: converted according to the declared shape
//!
//! Any mismatch fails the whole mapping; no partial tree is returned.

use indexmap::IndexMap;
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::ConfigValue;
use crate::document::{DocumentTree, Field, Node, ObjectEntry, Scalar};
use crate::error::{CoreError, Result};
use crate::intstr::IntOrString;
use crate::path::FieldPath;
use crate::presence::Presence;
use crate::schema::{FieldSchema, ResourceSchema, Shape, find_field};

/// Map a resource configuration onto a fresh document tree
pub fn map_resource<'s>(
    schema: &'s ResourceSchema,
    config: &ConfigValue,
) -> Result<DocumentTree<'s>> {
    debug!(kind = %schema.kind, "mapping configuration");
    let root = FieldPath::root();
    let entries = match config {
        ConfigValue::Unknown => return Ok(DocumentTree::new(&schema.fields)),
        ConfigValue::Object(attrs) => map_fields(&schema.fields, attrs, &root)?,
        other => {
            return Err(CoreError::violation(
                root,
                format!("expected object, got {}", other.type_name()),
            ));
        }
    };
    DocumentTree::from_entries(&schema.fields, entries)
}

fn map_fields(
    fields: &[FieldSchema],
    attrs: &IndexMap<String, ConfigValue>,
    path: &FieldPath,
) -> Result<Vec<ObjectEntry>> {
    if let Some(name) = attrs.keys().find(|name| find_field(fields, name).is_none()) {
        return Err(CoreError::violation(
            path.field(name),
            "attribute is not declared by the schema",
        ));
    }

    fields
        .iter()
        .map(|field| {
            Ok(ObjectEntry {
                name: field.name.clone(),
                key: field.key().to_string(),
                value: map_field(field, attrs.get(&field.name), &path.field(&field.name))?,
            })
        })
        .collect()
}

fn map_field(field: &FieldSchema, value: Option<&ConfigValue>, path: &FieldPath) -> Result<Field> {
    match value {
        None | Some(ConfigValue::Unknown) => Ok(Presence::Absent),
        Some(ConfigValue::Null) if field.nullable => Ok(Presence::Null),
        Some(ConfigValue::Null) => Err(CoreError::violation(path, "field is not nullable")),
        Some(value) => map_value(&field.shape, value, path).map(Presence::Set),
    }
}

/// Collection element: unknown elements stay absent, null elements are rejected
fn map_element(shape: &Shape, value: &ConfigValue, path: &FieldPath) -> Result<Field> {
    match value {
        ConfigValue::Unknown => Ok(Presence::Absent),
        ConfigValue::Null => Err(CoreError::violation(
            path,
            "collection elements cannot be null",
        )),
        value => map_value(shape, value, path).map(Presence::Set),
    }
}

fn map_value(shape: &Shape, value: &ConfigValue, path: &FieldPath) -> Result<Node> {
    let node = match (shape, value) {
        (Shape::String, ConfigValue::String(s)) => Node::Scalar(Scalar::String(s.clone())),
        (Shape::Bool, ConfigValue::Bool(b)) => Node::Scalar(Scalar::Bool(*b)),
        (Shape::Int, ConfigValue::Int(i)) => Node::Scalar(Scalar::Int(*i)),
        (Shape::Float, ConfigValue::Float(f)) => Node::Scalar(Scalar::Float(*f)),
        (Shape::Float, ConfigValue::Int(i)) => Node::Scalar(Scalar::Float(*i as f64)),
        (Shape::IntOrString, value) => {
            Node::Scalar(Scalar::IntOrString(decode_int_or_string(value, path)?))
        }
        (Shape::List { items }, ConfigValue::List(values)) => Node::List(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| map_element(items, v, &path.index(i)))
                .collect::<Result<_>>()?,
        ),
        (Shape::Map { values }, ConfigValue::Map(entries)) => Node::Map(
            entries
                .iter()
                .map(|(k, v)| Ok((k.clone(), map_element(values, v, &path.key(k))?)))
                .collect::<Result<BTreeMap<_, _>>>()?,
        ),
        (Shape::Object { fields }, ConfigValue::Object(attrs)) => {
            Node::Object(map_fields(fields, attrs, path)?)
        }
        (shape, value) => {
            return Err(CoreError::violation(
                path,
                format!("expected {}, got {}", shape.describe(), value.type_name()),
            ));
        }
    };
    Ok(node)
}

/// Decode an int-or-string field from the caller's declared representation
///
/// A string is never inspected for numeric content.
pub fn decode_int_or_string(value: &ConfigValue, path: &FieldPath) -> Result<IntOrString> {
    match value {
        ConfigValue::Int(i) => Ok(IntOrString::Int(*i)),
        ConfigValue::String(s) => Ok(IntOrString::String(s.clone())),
        other => Err(CoreError::violation(
            path,
            format!("expected int-or-string, got {}", other.type_name()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ResourceSchema {
        ResourceSchema::from_yaml(
            r#"
group: monitoring.coreos.com
version: v1
kind: ServiceMonitor
fields:
  - name: metadata
    type: object
    fields:
      - { name: name, type: string, required: true }
      - { name: labels, type: map, nullable: true, values: { type: string } }
  - name: spec
    type: object
    fields:
      - name: endpoints
        type: list
        items:
          type: object
          fields:
            - { name: port, type: int-or-string }
            - { name: honor_labels, key: honorLabels, type: bool }
            - { name: scrape_timeout, key: scrapeTimeout, type: float }
      - { name: replicas, type: int }
"#,
        )
        .unwrap()
    }

    fn metadata(name: &str) -> (&'static str, ConfigValue) {
        ("metadata", ConfigValue::object([("name", name.into())]))
    }

    #[test]
    fn test_unknown_and_missing_are_absent() {
        let schema = schema();
        let config = ConfigValue::object([metadata("web"), ("spec", ConfigValue::Unknown)]);
        let tree = map_resource(&schema, &config).unwrap();
        assert!(tree.get(&FieldPath::parse("spec")).is_absent());
        assert!(tree.get(&FieldPath::parse("metadata.labels")).is_absent());
        assert!(tree.get(&FieldPath::parse("metadata.name")).is_set());
    }

    #[test]
    fn test_null_on_nullable_field() {
        let schema = schema();
        let config = ConfigValue::object([(
            "metadata",
            ConfigValue::object([("name", "web".into()), ("labels", ConfigValue::Null)]),
        )]);
        let tree = map_resource(&schema, &config).unwrap();
        assert!(tree.get(&FieldPath::parse("metadata.labels")).is_null());
    }

    #[test]
    fn test_null_on_non_nullable_field() {
        let schema = schema();
        let config = ConfigValue::object([(
            "metadata",
            ConfigValue::object([("name", ConfigValue::Null)]),
        )]);
        let err = map_resource(&schema, &config).unwrap_err();
        assert!(err.is_contract_violation());
        assert!(err.to_string().contains("metadata.name"));
    }

    #[test]
    fn test_int_or_string_keeps_representation() {
        let schema = schema();
        let endpoints = ConfigValue::list([
            ConfigValue::object([("port", "https".into())]),
            ConfigValue::object([("port", "8080".into())]),
            ConfigValue::object([("port", ConfigValue::Int(8080))]),
        ]);
        let config = ConfigValue::object([metadata("web"), (
            "spec",
            ConfigValue::object([("endpoints", endpoints)]),
        )]);
        let tree = map_resource(&schema, &config).unwrap();
        let endpoints = FieldPath::parse("spec.endpoints");

        let port = |i: usize| tree.get(&endpoints.index(i).field("port")).into_set().cloned();
        assert_eq!(port(0), Some(Node::int_or_string("https")));
        assert_eq!(port(1), Some(Node::int_or_string("8080")));
        assert_eq!(port(2), Some(Node::int_or_string(8080)));
    }

    #[test]
    fn test_int_or_string_rejects_other_types() {
        let err = decode_int_or_string(&ConfigValue::Bool(true), &FieldPath::parse("port"))
            .unwrap_err();
        assert!(err.is_contract_violation());
        assert!(decode_int_or_string(&ConfigValue::Float(1.5), &FieldPath::root()).is_err());
    }

    #[test]
    fn test_empty_collections_are_set() {
        let schema = schema();
        let config = ConfigValue::object([
            (
                "metadata",
                ConfigValue::object([
                    ("name", "web".into()),
                    ("labels", ConfigValue::map::<String, _>([])),
                ]),
            ),
            ("spec", ConfigValue::object([("endpoints", ConfigValue::list([]))])),
        ]);
        let tree = map_resource(&schema, &config).unwrap();
        assert_eq!(
            tree.get(&FieldPath::parse("metadata.labels")),
            Presence::Set(&Node::Map(BTreeMap::new()))
        );
        assert_eq!(
            tree.get(&FieldPath::parse("spec.endpoints")),
            Presence::Set(&Node::List(Vec::new()))
        );
    }

    #[test]
    fn test_unknown_elements_do_not_collapse_collection() {
        let schema = schema();
        let config = ConfigValue::object([(
            "metadata",
            ConfigValue::object([
                ("name", "web".into()),
                ("labels", ConfigValue::map([("app", ConfigValue::Unknown)])),
            ]),
        )]);
        let tree = map_resource(&schema, &config).unwrap();
        let Presence::Set(labels) = tree.get(&FieldPath::parse("metadata.labels")) else {
            panic!("labels should be set");
        };
        assert!(labels.is_empty_container());
    }

    #[test]
    fn test_null_element_rejected() {
        let schema = schema();
        let config = ConfigValue::object([(
            "metadata",
            ConfigValue::object([
                ("name", "web".into()),
                ("labels", ConfigValue::map([("app", ConfigValue::Null)])),
            ]),
        )]);
        let err = map_resource(&schema, &config).unwrap_err();
        assert!(err.to_string().contains(r#"metadata.labels["app"]"#));
    }

    #[test]
    fn test_shape_mismatch_fails_whole_mapping() {
        let schema = schema();
        let config = ConfigValue::object([
            metadata("web"),
            ("spec", ConfigValue::object([("replicas", "three".into())])),
        ]);
        let err = map_resource(&schema, &config).unwrap_err();
        assert!(err.is_contract_violation());
        assert!(err.to_string().contains("spec.replicas"));
    }

    #[test]
    fn test_map_given_for_object_is_rejected() {
        let schema = schema();
        let config =
            ConfigValue::object([("metadata", ConfigValue::map([("name", "web".into())]))]);
        assert!(map_resource(&schema, &config).is_err());
    }

    #[test]
    fn test_undeclared_attribute_rejected() {
        let schema = schema();
        let config = ConfigValue::object([
            metadata("web"),
            ("status", ConfigValue::object::<String, _>([])),
        ]);
        let err = map_resource(&schema, &config).unwrap_err();
        assert!(err.to_string().contains("status"));
    }

    #[test]
    fn test_int_widens_to_float() {
        let schema = schema();
        let endpoints = ConfigValue::list([ConfigValue::object([(
            "scrape_timeout",
            ConfigValue::Int(10),
        )])]);
        let config =
            ConfigValue::object([("spec", ConfigValue::object([("endpoints", endpoints)]))]);
        let tree = map_resource(&schema, &config).unwrap();
        assert_eq!(
            tree.get(&FieldPath::parse("spec.endpoints").index(0).field("scrape_timeout")),
            Presence::Set(&Node::float(10.0))
        );
    }

    #[test]
    fn test_root_must_be_object() {
        let schema = schema();
        assert!(map_resource(&schema, &ConfigValue::String("x".into())).is_err());
        let tree = map_resource(&schema, &ConfigValue::Unknown).unwrap();
        assert!(tree.entries().iter().all(|e| e.value.is_absent()));
    }
}
