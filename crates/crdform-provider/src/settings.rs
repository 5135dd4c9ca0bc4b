//! Provider settings
//!
//! Stored in `~/.config/crdform/crdform.yaml`:
//!
//! ```yaml
//! stateDir: /var/lib/crdform/state
//! schemaDirs:
//!   - /etc/crdform/schemas
//! ```
//!
//! `CRDFORM_STATE_DIR` and `CRDFORM_SCHEMA_DIRS` (colon separated) override
//! the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::ResourceCatalog;
use crate::error::{ProviderError, Result};

/// Environment variable overriding the state directory
pub const STATE_DIR_ENV: &str = "CRDFORM_STATE_DIR";

/// Environment variable overriding the schema directories
pub const SCHEMA_DIRS_ENV: &str = "CRDFORM_SCHEMA_DIRS";

/// Provider settings file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSettings {
    /// Directory of the file state store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,

    /// Extra descriptor directories, loaded after the built-in kinds
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schema_dirs: Vec<PathBuf>,
}

impl ProviderSettings {
    /// Load settings from the default location, then apply the environment
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        let settings = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        Ok(settings.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Load settings from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Self = serde_yaml::from_str(&content).map_err(|e| {
            ProviderError::InvalidConfig(format!("{}: {}", path.display(), e))
        })?;
        Ok(settings)
    }

    /// Save settings to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default settings path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ProviderError::InvalidConfig("Could not determine config directory".to_string())
        })?;
        Ok(config_dir.join("crdform").join("crdform.yaml"))
    }

    /// Apply environment overrides read through `lookup`
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(STATE_DIR_ENV).filter(|v| !v.is_empty()) {
            self.state_dir = Some(PathBuf::from(dir));
        }
        if let Some(dirs) = lookup(SCHEMA_DIRS_ENV) {
            self.schema_dirs = dirs
                .split(':')
                .filter(|d| !d.is_empty())
                .map(PathBuf::from)
                .collect();
        }
        self
    }

    /// State directory, falling back to the user data directory
    pub fn resolved_state_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.state_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir().ok_or_else(|| {
            ProviderError::InvalidConfig("Could not determine data directory".to_string())
        })?;
        Ok(data_dir.join("crdform").join("state"))
    }

    /// Built-in kinds plus every configured schema directory
    pub fn catalog(&self) -> Result<ResourceCatalog> {
        let mut catalog = ResourceCatalog::builtin()?;
        for dir in &self.schema_dirs {
            catalog.load_dir(dir)?;
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_settings_serialization() {
        let settings: ProviderSettings =
            serde_yaml::from_str("stateDir: /tmp/state\nschemaDirs:\n  - /a\n  - /b\n").unwrap();
        assert_eq!(settings.state_dir, Some(PathBuf::from("/tmp/state")));
        assert_eq!(settings.schema_dirs.len(), 2);
    }

    #[test]
    fn test_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("crdform.yaml");
        let settings = ProviderSettings {
            state_dir: Some(tmp.path().join("state")),
            schema_dirs: vec![],
        };
        settings.save_to(&path).unwrap();
        assert_eq!(ProviderSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_load_invalid_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("crdform.yaml");
        std::fs::write(&path, "stateDir: [unclosed").unwrap();
        let err = ProviderSettings::load_from(&path).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidConfig(_)));
    }

    #[test]
    fn test_env_overrides() {
        let settings = ProviderSettings {
            state_dir: Some(PathBuf::from("/from/file")),
            schema_dirs: vec![PathBuf::from("/file/schemas")],
        }
        .with_env_overrides(env(&[
            (STATE_DIR_ENV, "/from/env"),
            (SCHEMA_DIRS_ENV, "/one::/two"),
        ]));

        assert_eq!(settings.state_dir, Some(PathBuf::from("/from/env")));
        assert_eq!(
            settings.schema_dirs,
            vec![PathBuf::from("/one"), PathBuf::from("/two")]
        );
    }

    #[test]
    fn test_no_env_keeps_file_values() {
        let settings = ProviderSettings {
            state_dir: Some(PathBuf::from("/from/file")),
            schema_dirs: vec![],
        }
        .with_env_overrides(env(&[]));
        assert_eq!(settings.resolved_state_dir().unwrap(), PathBuf::from("/from/file"));
    }

    #[test]
    fn test_catalog_loads_schema_dirs() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("widget.yaml"),
            "group: acme.example.com\nversion: v1\nkind: Widget\nfields: []\n",
        )
        .unwrap();

        let settings = ProviderSettings {
            state_dir: None,
            schema_dirs: vec![tmp.path().to_path_buf()],
        };
        let catalog = settings.catalog().unwrap();
        assert!(catalog.contains("k8s_acme_example_com_widget_v1_manifest"));
        assert!(catalog.contains("k8s_config_map_v1_manifest"));
    }
}
