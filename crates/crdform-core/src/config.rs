//! Caller-supplied configuration values
//!
//! The host hands every resource a dynamically typed value tree. Each node is
//! one closed variant, including `Unknown` for values that will only be known
//! later, so "not provided", "null" and "provided" never blur together.

use indexmap::IndexMap;
use serde_yaml::Value as YamlValue;

use crate::error::{CoreError, Result};
use crate::path::FieldPath;
use crate::schema::{ResourceSchema, Shape, find_field};

/// YAML tag marking an unknown value in configuration documents
pub const UNKNOWN_TAG: &str = "unknown";

/// Configuration value as supplied by the caller
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConfigValue {
    /// Not known yet; treated as not provided
    #[default]
    Unknown,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<ConfigValue>),
    Map(IndexMap<String, ConfigValue>),
    Object(IndexMap<String, ConfigValue>),
}

impl ConfigValue {
    /// Object value from attribute/value pairs
    pub fn object<K, I>(attrs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ConfigValue)>,
    {
        Self::Object(attrs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Map value from key/value pairs
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ConfigValue)>,
    {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn list<I: IntoIterator<Item = ConfigValue>>(items: I) -> Self {
        Self::List(items.into_iter().collect())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Object(_) => "object",
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Attribute of an object value
    pub fn attr(&self, name: &str) -> Option<&ConfigValue> {
        match self {
            Self::Object(attrs) => attrs.get(name),
            _ => None,
        }
    }

    /// Parse a YAML (or JSON) configuration document for `schema`
    pub fn from_yaml(yaml: &str, schema: &ResourceSchema) -> Result<Self> {
        let value: YamlValue = serde_yaml::from_str(yaml)?;
        let root = Shape::Object {
            fields: schema.fields.clone(),
        };
        Self::from_yaml_value(&value, Some(&root), &FieldPath::root())
    }

    /// Convert a parsed YAML value, using `shape` to tell objects from maps
    ///
    /// Mappings become `Object` where the declared shape is an object and `Map`
    /// otherwise. Values tagged `!unknown` become `Unknown`.
    pub fn from_yaml_value(
        value: &YamlValue,
        shape: Option<&Shape>,
        path: &FieldPath,
    ) -> Result<Self> {
        Ok(match value {
            YamlValue::Null => Self::Null,
            YamlValue::Bool(b) => Self::Bool(*b),
            YamlValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if n.is_u64() {
                    return Err(CoreError::violation(
                        path,
                        format!("integer {} is out of range", n),
                    ));
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            YamlValue::String(s) => Self::String(s.clone()),
            YamlValue::Sequence(items) => {
                let item_shape = match shape {
                    Some(Shape::List { items }) => Some(items.as_ref()),
                    _ => None,
                };
                Self::List(
                    items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| Self::from_yaml_value(item, item_shape, &path.index(i)))
                        .collect::<Result<_>>()?,
                )
            }
            YamlValue::Mapping(mapping) => {
                let mut entries = IndexMap::with_capacity(mapping.len());
                for (key, item) in mapping {
                    let key = key.as_str().ok_or_else(|| {
                        CoreError::violation(path, "mapping keys must be strings")
                    })?;
                    let (child_path, child_shape) = match shape {
                        Some(Shape::Object { fields }) => (
                            path.field(key),
                            find_field(fields, key).map(|(_, f)| &f.shape),
                        ),
                        Some(Shape::Map { values }) => (path.key(key), Some(values.as_ref())),
                        _ => (path.key(key), None),
                    };
                    entries.insert(
                        key.to_string(),
                        Self::from_yaml_value(item, child_shape, &child_path)?,
                    );
                }
                match shape {
                    Some(Shape::Object { .. }) => Self::Object(entries),
                    _ => Self::Map(entries),
                }
            }
            YamlValue::Tagged(tagged) => {
                if tagged.tag == UNKNOWN_TAG {
                    Self::Unknown
                } else {
                    return Err(CoreError::violation(
                        path,
                        format!("unsupported tag {}", tagged.tag),
                    ));
                }
            }
        })
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}
