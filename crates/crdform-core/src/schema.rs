//! Declarative resource schemas
//!
//! A resource kind is described entirely by data: its API group, version and
//! kind, plus an ordered list of field declarations. Descriptors are written in
//! YAML:
//!
//! ```yaml
//! group: monitoring.coreos.com
//! version: v1
//! kind: ServiceMonitor
//! fields:
//!   - name: metadata
//!     type: object
//!     required: true
//!     fields:
//!       - { name: name, type: string, required: true }
//!       - { name: labels, type: map, values: { type: string } }
//!   - name: spec
//!     type: object
//!     fields:
//!       - name: endpoints
//!         type: list
//!         items:
//!           type: object
//!           fields:
//!             - { name: port, type: int-or-string }
//!             - { name: target_port, key: targetPort, type: int-or-string }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::document::{Node, ObjectEntry};
use crate::error::{CoreError, Result};
use crate::presence::Presence;

/// Manifest key holding the API group/version
pub const API_VERSION_KEY: &str = "apiVersion";

/// Manifest key holding the resource kind
pub const KIND_KEY: &str = "kind";

/// Declared shape of a field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Shape {
    String,
    Bool,
    Int,
    Float,
    IntOrString,
    List { items: Box<Shape> },
    Map { values: Box<Shape> },
    Object { fields: Vec<FieldSchema> },
}

impl Shape {
    /// Short human-readable form, e.g. `list(map(string))`
    pub fn describe(&self) -> String {
        match self {
            Self::String => "string".to_string(),
            Self::Bool => "bool".to_string(),
            Self::Int => "int".to_string(),
            Self::Float => "float".to_string(),
            Self::IntOrString => "int-or-string".to_string(),
            Self::List { items } => format!("list({})", items.describe()),
            Self::Map { values } => format!("map({})", values.describe()),
            Self::Object { .. } => "object".to_string(),
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::List { .. } | Self::Map { .. } | Self::Object { .. })
    }

    /// Empty container of this shape, with every object field absent
    pub fn empty_node(&self) -> Option<Node> {
        match self {
            Self::List { .. } => Some(Node::List(Vec::new())),
            Self::Map { .. } => Some(Node::Map(Default::default())),
            Self::Object { fields } => Some(Node::Object(empty_entries(fields))),
            _ => None,
        }
    }
}

/// Object entries for `fields`, all absent, in declaration order
pub(crate) fn empty_entries(fields: &[FieldSchema]) -> Vec<ObjectEntry> {
    fields
        .iter()
        .map(|f| ObjectEntry {
            name: f.name.clone(),
            key: f.key().to_string(),
            value: Presence::Absent,
        })
        .collect()
}

/// Declaration of a single field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSchema {
    /// Attribute name as the caller addresses it
    pub name: String,

    /// Manifest key, when it differs from the attribute name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(flatten)]
    pub shape: Shape,

    #[serde(default)]
    pub required: bool,

    /// Whether the caller may explicitly null this field
    #[serde(default)]
    pub nullable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            key: None,
            shape,
            required: false,
            nullable: false,
            description: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Key this field is emitted under in the manifest
    pub fn key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }
}

/// Find a field declaration by attribute name
pub fn find_field<'a>(fields: &'a [FieldSchema], name: &str) -> Option<(usize, &'a FieldSchema)> {
    fields.iter().enumerate().find(|(_, f)| f.name == name)
}

/// Schema of one resource kind
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSchema {
    /// API group; empty for the core group
    #[serde(default)]
    pub group: String,

    pub version: String,

    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Root fields in declaration order
    pub fields: Vec<FieldSchema>,
}

impl ResourceSchema {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Parse and validate a YAML descriptor
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let schema: Self = serde_yaml::from_str(yaml)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Load and validate a descriptor file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content).map_err(|e| match e {
            CoreError::InvalidSchema { message } => CoreError::InvalidSchema {
                message: format!("{}: {}", path.as_ref().display(), message),
            },
            other => other,
        })
    }

    /// `group/version`, or just `version` for the core group
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// Type name the host addresses this resource by,
    /// e.g. `k8s_monitoring_coreos_com_service_monitor_v1_manifest`
    pub fn type_name(&self) -> String {
        let mut parts = vec!["k8s".to_string()];
        if !self.group.is_empty() {
            parts.push(self.group.replace(['.', '-'], "_"));
        }
        parts.push(to_snake_case(&self.kind));
        parts.push(self.version.to_lowercase());
        parts.push("manifest".to_string());
        parts.join("_")
    }

    /// Check structural rules the engine relies on
    pub fn validate(&self) -> Result<()> {
        if self.kind.is_empty() {
            return Err(CoreError::InvalidSchema {
                message: "kind must not be empty".to_string(),
            });
        }
        if self.version.is_empty() {
            return Err(CoreError::InvalidSchema {
                message: format!("{}: version must not be empty", self.kind),
            });
        }
        validate_fields(&self.fields, &self.kind)
    }
}

fn validate_fields(fields: &[FieldSchema], context: &str) -> Result<()> {
    let mut names = HashSet::new();
    let mut keys = HashSet::new();
    for field in fields {
        if field.name.is_empty() {
            return Err(CoreError::InvalidSchema {
                message: format!("{}: field with empty name", context),
            });
        }
        if !names.insert(field.name.as_str()) {
            return Err(CoreError::InvalidSchema {
                message: format!("{}: duplicate field '{}'", context, field.name),
            });
        }
        if !keys.insert(field.key()) {
            return Err(CoreError::InvalidSchema {
                message: format!("{}: duplicate manifest key '{}'", context, field.key()),
            });
        }
        validate_shape(&field.shape, &format!("{}.{}", context, field.name))?;
    }
    Ok(())
}

fn validate_shape(shape: &Shape, context: &str) -> Result<()> {
    match shape {
        Shape::List { items } => validate_shape(items, context),
        Shape::Map { values } => validate_shape(values, context),
        Shape::Object { fields } => validate_fields(fields, context),
        _ => Ok(()),
    }
}

/// `IngressRouteTCP` -> `ingress_route_tcp`
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower) {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICE_MONITOR: &str = r#"
group: monitoring.coreos.com
version: v1
kind: ServiceMonitor
fields:
  - name: metadata
    type: object
    required: true
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
            - { name: target_port, key: targetPort, type: int-or-string }
"#;

    #[test]
    fn test_parse_descriptor() {
        let schema = ResourceSchema::from_yaml(SERVICE_MONITOR).unwrap();
        assert_eq!(schema.kind, "ServiceMonitor");
        assert_eq!(schema.api_version(), "monitoring.coreos.com/v1");
        assert_eq!(schema.fields.len(), 2);

        let metadata = &schema.fields[0];
        assert!(metadata.required);
        let Shape::Object { fields } = &metadata.shape else {
            panic!("metadata should be an object");
        };
        assert_eq!(fields[1].shape.describe(), "map(string)");
        assert!(fields[1].nullable);

        let Shape::Object { fields } = &schema.fields[1].shape else {
            panic!("spec should be an object");
        };
        let Shape::List { items } = &fields[0].shape else {
            panic!("endpoints should be a list");
        };
        let Shape::Object { fields } = items.as_ref() else {
            panic!("endpoint should be an object");
        };
        assert_eq!(fields[1].key(), "targetPort");
        assert_eq!(fields[0].key(), "port");
        assert_eq!(fields[0].shape, Shape::IntOrString);
    }

    #[test]
    fn test_type_name() {
        let schema = ResourceSchema::from_yaml(SERVICE_MONITOR).unwrap();
        assert_eq!(
            schema.type_name(),
            "k8s_monitoring_coreos_com_service_monitor_v1_manifest"
        );

        let core = ResourceSchema::new("", "v1", "ConfigMap");
        assert_eq!(core.api_version(), "v1");
        assert_eq!(core.type_name(), "k8s_config_map_v1_manifest");

        let traefik = ResourceSchema::new("traefik.io", "v1alpha1", "IngressRouteTCP");
        assert_eq!(traefik.type_name(), "k8s_traefik_io_ingress_route_tcp_v1alpha1_manifest");
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("ServiceMonitor"), "service_monitor");
        assert_eq!(to_snake_case("HTTPRoute"), "http_route");
        assert_eq!(to_snake_case("IngressRouteTCP"), "ingress_route_tcp");
        assert_eq!(to_snake_case("Certificate"), "certificate");
    }

    #[test]
    fn test_duplicate_fields_rejected() {
        let yaml = r#"
version: v1
kind: Thing
fields:
  - { name: a, type: string }
  - { name: a, type: int }
"#;
        let err = ResourceSchema::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, CoreError::InvalidSchema { .. }));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let yaml = r#"
version: v1
kind: Thing
fields:
  - { name: a_b, key: aB, type: string }
  - { name: aB, type: string }
"#;
        assert!(ResourceSchema::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let yaml = r#"
version: v1
kind: Thing
fields:
  - { name: a, type: decimal }
"#;
        assert!(matches!(
            ResourceSchema::from_yaml(yaml),
            Err(CoreError::Yaml(_))
        ));
    }

    #[test]
    fn test_builder() {
        let schema = ResourceSchema::new("example.com", "v1", "Widget")
            .with_field(FieldSchema::new("size", Shape::Int).required())
            .with_field(FieldSchema::new("note", Shape::String).nullable());
        assert!(schema.validate().is_ok());
        assert!(schema.fields[0].required);
        assert!(schema.fields[1].nullable);
    }
}
