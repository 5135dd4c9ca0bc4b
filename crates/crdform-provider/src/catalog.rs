//! Resource catalog
//!
//! The table of resource kinds the provider manages, keyed by type name.
//! A handful of kinds are built in; more are loaded from descriptor
//! directories.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crdform_core::ResourceSchema;
use tracing::debug;

use crate::error::{ProviderError, Result};

/// Descriptors compiled into the binary
const BUILTIN_DESCRIPTORS: &[(&str, &str)] = &[
    ("certificate.yaml", include_str!("../schemas/certificate.yaml")),
    ("config_map.yaml", include_str!("../schemas/config_map.yaml")),
    ("ingress_route.yaml", include_str!("../schemas/ingress_route.yaml")),
    ("service_monitor.yaml", include_str!("../schemas/service_monitor.yaml")),
];

/// Resource schemas keyed by type name
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    schemas: BTreeMap<String, ResourceSchema>,
}

impl ResourceCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the built-in resource kinds
    pub fn builtin() -> Result<Self> {
        let mut catalog = Self::new();
        for (name, yaml) in BUILTIN_DESCRIPTORS {
            let schema = ResourceSchema::from_yaml(yaml).map_err(|e| {
                ProviderError::InvalidConfig(format!("built-in descriptor {}: {}", name, e))
            })?;
            catalog.register(schema)?;
        }
        Ok(catalog)
    }

    /// Add a schema; its type name must not be taken
    pub fn register(&mut self, schema: ResourceSchema) -> Result<()> {
        let type_name = schema.type_name();
        if self.schemas.contains_key(&type_name) {
            return Err(ProviderError::DuplicateResourceType { type_name });
        }
        debug!(
            type_name = %type_name,
            api_version = %schema.api_version(),
            "registered resource type"
        );
        self.schemas.insert(type_name, schema);
        Ok(())
    }

    /// Load every `.yaml`/`.yml` descriptor below `dir`
    ///
    /// Files are visited in sorted order. Returns the number of schemas added.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        let files = descriptor_files(dir)?;
        let count = files.len();
        for path in files {
            let schema = ResourceSchema::from_file(&path)?;
            self.register(schema)?;
        }
        Ok(count)
    }

    /// Look up a schema by type name
    pub fn get(&self, type_name: &str) -> Result<&ResourceSchema> {
        self.schemas
            .get(type_name)
            .ok_or_else(|| ProviderError::UnknownResourceType {
                type_name: type_name.to_string(),
            })
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.schemas.contains_key(type_name)
    }

    /// Type names in sorted order
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Schemas in type-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResourceSchema)> {
        self.schemas.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

fn descriptor_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ProviderError::InvalidConfig(format!(
            "schema directory not found: {}",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() {
            if let Some(ext) = path.extension() {
                let ext = ext.to_string_lossy().to_lowercase();
                if matches!(ext.as_str(), "yaml" | "yml") {
                    files.push(path.to_path_buf());
                }
            }
        }
    }

    files.sort();
    Ok(files)
}
