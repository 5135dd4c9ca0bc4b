//! crdform Core - the configuration attribute bridge
//!
//! This crate turns a caller's dynamically typed configuration into a
//! byte-stable YAML manifest:
//! - `IntOrString`: integer-or-string scalar that keeps its representation
//! - `Presence`: absent / null / set tracking for every field
//! - `DocumentTree`: presence-tracked document mirroring a resource schema
//! - `map_resource`: configuration to document mapping
//! - `assemble`: identity injection and deterministic YAML emission
//! - `ResourceSchema`: declarative description of a resource kind
//! - `validate_config`: collects every problem in a configuration

pub mod assembler;
pub mod config;
pub mod document;
pub mod error;
pub mod intstr;
pub mod mapper;
pub mod path;
pub mod presence;
pub mod schema;
pub mod validate;

pub use assembler::{Manifest, ManifestIdentity, assemble};
pub use config::ConfigValue;
pub use document::{DocumentTree, Field, Node, ObjectEntry, Scalar};
pub use error::{CoreError, Result};
pub use intstr::IntOrString;
pub use mapper::map_resource;
pub use path::{FieldPath, Segment};
pub use presence::Presence;
pub use schema::{FieldSchema, ResourceSchema, Shape};
pub use validate::{ValidationIssue, ValidationResult, validate_config};

/// Map `config` for `schema` and assemble the manifest in one step
pub fn render(schema: &ResourceSchema, config: &ConfigValue) -> Result<Manifest> {
    let tree = map_resource(schema, config)?;
    assemble(&tree, &ManifestIdentity::of(schema))
}
