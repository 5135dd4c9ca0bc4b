//! Configuration validation
//!
//! Reports every problem in a configuration at once instead of stopping at
//! the first, which is what mapping does. Required attributes are checked
//! here only; the mapper itself treats a missing required attribute as
//! absent. An unknown value satisfies a required attribute.

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::ConfigValue;
use crate::error::CoreError;
use crate::path::FieldPath;
use crate::schema::{FieldSchema, ResourceSchema, Shape, find_field};

/// A single problem found in a configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Attribute path, `<root>` for the configuration itself
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(path: &FieldPath, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

/// Result of configuration validation
#[derive(Debug, Default, Serialize)]
pub struct ValidationResult {
    /// Whether the configuration is valid
    pub is_valid: bool,
    /// Problems, in attribute order
    pub errors: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Create a successful validation result
    pub fn success() -> Self {
        Self {
            is_valid: true,
            errors: vec![],
        }
    }

    /// Create a result from the collected issues
    pub fn from_issues(errors: Vec<ValidationIssue>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validate `config` against `schema`
///
/// Runs the required-attribute walk, then a full render so shape and
/// encoding errors are reported too.
pub fn validate_config(schema: &ResourceSchema, config: &ConfigValue) -> ValidationResult {
    let mut issues = Vec::new();
    let root = FieldPath::root();

    match config {
        ConfigValue::Unknown => {}
        ConfigValue::Object(attrs) => check_fields(&schema.fields, attrs, &root, &mut issues),
        other => issues.push(ValidationIssue::new(
            &root,
            format!("expected object, got {}", other.type_name()),
        )),
    }

    if let Err(e) = crate::render(schema, config) {
        let issue = match e {
            CoreError::SchemaContractViolation { path, message }
            | CoreError::AssemblyFailure { path, message } => ValidationIssue { path, message },
            other => ValidationIssue::new(&root, other.to_string()),
        };
        if !issues.contains(&issue) {
            issues.push(issue);
        }
    }

    ValidationResult::from_issues(issues)
}

fn check_fields(
    fields: &[FieldSchema],
    attrs: &IndexMap<String, ConfigValue>,
    path: &FieldPath,
    issues: &mut Vec<ValidationIssue>,
) {
    for name in attrs.keys() {
        if find_field(fields, name).is_none() {
            issues.push(ValidationIssue::new(
                &path.field(name),
                "attribute is not declared by the schema",
            ));
        }
    }

    for field in fields {
        let field_path = path.field(&field.name);
        match attrs.get(&field.name) {
            None if field.required => issues.push(ValidationIssue::new(
                &field_path,
                "required attribute is missing",
            )),
            Some(ConfigValue::Null) if field.required => issues.push(ValidationIssue::new(
                &field_path,
                "required attribute must not be null",
            )),
            Some(value) => check_nested(&field.shape, value, &field_path, issues),
            None => {}
        }
    }
}

/// Descend into objects, including those inside lists and maps
fn check_nested(
    shape: &Shape,
    value: &ConfigValue,
    path: &FieldPath,
    issues: &mut Vec<ValidationIssue>,
) {
    match (shape, value) {
        (Shape::Object { fields }, ConfigValue::Object(attrs)) => {
            check_fields(fields, attrs, path, issues)
        }
        (Shape::List { items }, ConfigValue::List(values)) => {
            for (i, v) in values.iter().enumerate() {
                check_nested(items, v, &path.index(i), issues);
            }
        }
        (Shape::Map { values }, ConfigValue::Map(entries)) => {
            for (k, v) in entries {
                check_nested(values, v, &path.key(k), issues);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ResourceSchema {
        ResourceSchema::from_yaml(
            r#"
version: v1
kind: Service
fields:
  - name: metadata
    type: object
    required: true
    fields:
      - { name: name, type: string, required: true }
  - name: spec
    type: object
    fields:
      - name: ports
        type: list
        items:
          type: object
          fields:
            - { name: port, type: int-or-string, required: true }
            - { name: protocol, type: string }
"#,
        )
        .unwrap()
    }

    fn paths(result: &ValidationResult) -> Vec<&str> {
        result.errors.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn test_valid_config() {
        let config =
            ConfigValue::object([("metadata", ConfigValue::object([("name", "web".into())]))]);
        let result = validate_config(&schema(), &config);
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_missing_required() {
        let config = ConfigValue::object([("metadata", ConfigValue::object::<&str, _>([]))]);
        let result = validate_config(&schema(), &config);
        assert!(!result.is_valid);
        assert_eq!(paths(&result), ["metadata.name"]);
        assert_eq!(result.errors[0].message, "required attribute is missing");
    }

    #[test]
    fn test_unknown_satisfies_required() {
        let config = ConfigValue::object([(
            "metadata",
            ConfigValue::object([("name", ConfigValue::Unknown)]),
        )]);
        assert!(validate_config(&schema(), &config).is_valid);
    }

    #[test]
    fn test_required_inside_list_elements() {
        let config = ConfigValue::object([
            ("metadata", ConfigValue::object([("name", "web".into())])),
            (
                "spec",
                ConfigValue::object([(
                    "ports",
                    ConfigValue::list([
                        ConfigValue::object([("port", ConfigValue::Int(80))]),
                        ConfigValue::object([("protocol", "TCP".into())]),
                    ]),
                )]),
            ),
        ]);
        let result = validate_config(&schema(), &config);
        assert_eq!(paths(&result), ["spec.ports[1].port"]);
    }

    #[test]
    fn test_reports_every_undeclared_attribute() {
        let config = ConfigValue::object([
            ("metadata", ConfigValue::object([("name", "web".into())])),
            ("extra", ConfigValue::Bool(true)),
            ("other", ConfigValue::Int(1)),
        ]);
        let result = validate_config(&schema(), &config);
        assert_eq!(paths(&result), ["extra", "other"]);
    }

    #[test]
    fn test_reports_shape_mismatch() {
        let config = ConfigValue::object([(
            "metadata",
            ConfigValue::object([("name", ConfigValue::Int(3))]),
        )]);
        let result = validate_config(&schema(), &config);
        assert_eq!(paths(&result), ["metadata.name"]);
        assert!(result.errors[0].message.contains("expected string"));
    }

    #[test]
    fn test_required_null() {
        let config = ConfigValue::object([("metadata", ConfigValue::Null)]);
        let result = validate_config(&schema(), &config);
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].message, "required attribute must not be null");
    }
}
